pub mod history_chart;
pub mod overview;
pub mod system_info;
