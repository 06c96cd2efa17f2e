pub mod event;
pub mod screens;
pub mod terminal;
pub mod view_state;
pub mod views;
pub mod widgets;
