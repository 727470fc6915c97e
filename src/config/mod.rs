//! Settings loading.
//!
//! Settings live in an optional YAML file and tune network behavior,
//! cache freshness, command time limits, install locations and the
//! offline fallback version lists.

pub mod loader;
pub mod schema;

pub use loader::{
    default_config_path, load_settings, load_settings_file, parse_settings, validate, CONFIG_ENV,
};
pub use schema::{CacheSettings, NetworkSettings, Settings, Timeouts};
