pub mod composite;
pub mod confirm;
pub mod history;
pub mod hit_test;
pub mod input;
pub mod keyboard;
pub mod laser;
pub mod model;
pub mod overlay;
pub mod render;
pub mod save;
pub mod selection;
pub mod settings;
pub mod settings_store;
pub mod settings_ui;
pub mod text;
pub mod theme;
pub mod toolbar;
pub mod zoom;

pub use input::DrawInputState;
pub use overlay::OverlayApp;
pub use settings::DrawSettings;
