pub mod draw;
pub mod hotkey;
pub mod logging;
