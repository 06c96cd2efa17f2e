pub mod error_toast;
pub mod help_overlay;
pub mod loading_screen;
