//! Shared building blocks for reel-junk: bounded concurrent mapping and
//! application settings.

pub mod error;
pub mod settings;
pub mod worker_pool;

pub use error::LibError;
pub use settings::{ConfigFile, SettingSource, SettingSources, Settings, config_path};
pub use worker_pool::map_limit;
