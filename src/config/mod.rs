//! Project config loading, validation, persistence and hot reload.

pub mod hot_reload;
pub mod loader;
pub mod manager;
pub mod model;
pub mod notice;
pub mod scaffold;

pub use hot_reload::{ConfigWatcher, FileEvent};
pub use manager::{
    ConfigManager, ConfigState, LoadOptions, ManagerSettings, CONFIG_FILENAME, DEFAULT_CONTACT_URL,
};
pub use model::Configuration;
