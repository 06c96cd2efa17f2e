pub mod dashboard;
pub mod server_picker;
