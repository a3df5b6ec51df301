//! INI-backed persistence for [`Settings`].
//!
//! The config file is a small INI document; every setting is addressable as
//! `section.key` through [`ConfigKey`], which the CLI uses for its
//! `config get`/`config set`/`config list` commands. Loading starts from
//! defaults and applies only the keys present in the file, so partial
//! configs and configs written by older builds stay valid.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::config::settings::{parse_language_list, Settings};

/// Errors from loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or parsed.
    #[error("failed to load config {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: ini::Error,
    },

    /// The config file could not be written.
    #[error("failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A value does not parse as the key's type.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// The `section.key` name matches no known setting.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Default location of the config file, under the platform config directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scrycache")
        .join("config.ini")
}

/// Addressable configuration keys, one per [`Settings`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    CacheRoot,
    RecordDir,
    ImageDir,
    JaBulkFile,
    OracleBulkFile,
    Languages,
    Concurrency,
    Retries,
    TimeoutMs,
    BaseDelayMs,
    ShowManaCurve,
    ShowCardTypes,
    ShowColorCounts,
}

impl ConfigKey {
    /// All keys, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::CacheRoot,
            ConfigKey::RecordDir,
            ConfigKey::ImageDir,
            ConfigKey::JaBulkFile,
            ConfigKey::OracleBulkFile,
            ConfigKey::Languages,
            ConfigKey::Concurrency,
            ConfigKey::Retries,
            ConfigKey::TimeoutMs,
            ConfigKey::BaseDelayMs,
            ConfigKey::ShowManaCurve,
            ConfigKey::ShowCardTypes,
            ConfigKey::ShowColorCounts,
        ]
    }

    /// The INI section this key lives in.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::CacheRoot
            | ConfigKey::RecordDir
            | ConfigKey::ImageDir
            | ConfigKey::JaBulkFile
            | ConfigKey::OracleBulkFile => "cache",
            ConfigKey::Languages | ConfigKey::Concurrency => "resolver",
            ConfigKey::Retries | ConfigKey::TimeoutMs | ConfigKey::BaseDelayMs => "network",
            ConfigKey::ShowManaCurve | ConfigKey::ShowCardTypes | ConfigKey::ShowColorCounts => {
                "display"
            }
        }
    }

    /// The key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::CacheRoot => "root",
            ConfigKey::RecordDir => "record_dir",
            ConfigKey::ImageDir => "image_dir",
            ConfigKey::JaBulkFile => "ja_bulk_file",
            ConfigKey::OracleBulkFile => "oracle_bulk_file",
            ConfigKey::Languages => "languages",
            ConfigKey::Concurrency => "concurrency",
            ConfigKey::Retries => "retries",
            ConfigKey::TimeoutMs => "timeout_ms",
            ConfigKey::BaseDelayMs => "base_delay_ms",
            ConfigKey::ShowManaCurve => "mana_curve",
            ConfigKey::ShowCardTypes => "card_types",
            ConfigKey::ShowColorCounts => "color_counts",
        }
    }

    /// Full dotted name, `section.key`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Reads this key's current value as a string.
    pub fn get(&self, settings: &Settings) -> String {
        match self {
            ConfigKey::CacheRoot => settings.cache_root.clone(),
            ConfigKey::RecordDir => settings.record_dir.clone(),
            ConfigKey::ImageDir => settings.image_dir.clone(),
            ConfigKey::JaBulkFile => settings.ja_bulk_file.clone(),
            ConfigKey::OracleBulkFile => settings.oracle_bulk_file.clone(),
            ConfigKey::Languages => settings.languages.join(","),
            ConfigKey::Concurrency => settings.concurrency.to_string(),
            ConfigKey::Retries => settings.retries.to_string(),
            ConfigKey::TimeoutMs => settings.timeout_ms.to_string(),
            ConfigKey::BaseDelayMs => settings.base_delay_ms.to_string(),
            ConfigKey::ShowManaCurve => settings.show_mana_curve.to_string(),
            ConfigKey::ShowCardTypes => settings.show_card_types.to_string(),
            ConfigKey::ShowColorCounts => settings.show_color_counts.to_string(),
        }
    }

    /// Applies a string value to this key, parsing it as the key's type.
    pub fn set(&self, settings: &mut Settings, value: &str) -> Result<(), ConfigError> {
        match self {
            ConfigKey::CacheRoot => settings.cache_root = value.to_string(),
            ConfigKey::RecordDir => settings.record_dir = value.to_string(),
            ConfigKey::ImageDir => settings.image_dir = value.to_string(),
            ConfigKey::JaBulkFile => settings.ja_bulk_file = value.to_string(),
            ConfigKey::OracleBulkFile => settings.oracle_bulk_file = value.to_string(),
            ConfigKey::Languages => settings.languages = parse_language_list(value),
            ConfigKey::Concurrency => {
                settings.concurrency = self.parse_number::<usize>(value)?.max(1)
            }
            ConfigKey::Retries => settings.retries = self.parse_number(value)?,
            ConfigKey::TimeoutMs => settings.timeout_ms = self.parse_number(value)?,
            ConfigKey::BaseDelayMs => settings.base_delay_ms = self.parse_number(value)?,
            ConfigKey::ShowManaCurve => settings.show_mana_curve = self.parse_bool(value)?,
            ConfigKey::ShowCardTypes => settings.show_card_types = self.parse_bool(value)?,
            ConfigKey::ShowColorCounts => settings.show_color_counts = self.parse_bool(value)?,
        }
        Ok(())
    }

    fn parse_number<T: FromStr>(&self, value: &str) -> Result<T, ConfigError> {
        value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
        })
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: self.name(),
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl Settings {
    /// Loads settings from an INI file, applying file values over defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut settings = Settings::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut settings, value)?;
            }
        }
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Writes all settings to an INI file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_error)
    }
}
