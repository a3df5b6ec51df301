//! Configuration: settings, INI persistence and cache path layout.

mod file;
mod layout;
mod settings;

pub use file::{config_file_path, ConfigError, ConfigKey};
pub use layout::{normalize_path, CacheLayout};
pub use settings::{
    parse_language_list, Settings, DEFAULT_CACHE_ROOT, DEFAULT_CONCURRENCY, DEFAULT_JA_BULK_FILE,
    DEFAULT_LANGUAGES, DEFAULT_ORACLE_BULK_FILE,
};
