//! Cache configuration: raw values, validation, and file loading.
mod apply;
mod loader;
mod types;


pub use loader::{DEFAULT_CONFIG_FILES, load_config, load_config_file};
pub use types::{CacheConfig, CacheSettings};
