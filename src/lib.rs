pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod status;
pub mod theme;
pub mod tui;
