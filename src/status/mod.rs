pub mod client;
pub mod hardware;
pub mod poller;
pub mod types;
