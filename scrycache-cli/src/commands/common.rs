//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use scrycache::config::{config_file_path, parse_language_list, Settings};
use scrycache::ScrycacheApp;

use crate::error::CliError;

/// Options shared by every command that resolves cards.
#[derive(Debug, clap::Args)]
pub struct AppArgs {
    /// Configuration file to load (defaults to the per-user location)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the cache tree lives under
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Cache root folder inside the base directory
    #[arg(long, value_name = "DIR")]
    pub cache_root: Option<String>,

    /// Number of concurrent resolution workers
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Lookup locale order, comma separated (e.g. "ja,en")
    #[arg(long, value_name = "LIST")]
    pub languages: Option<String>,
}

impl AppArgs {
    /// Resolves settings for this invocation.
    ///
    /// An explicit `--config` file must exist. The default per-user file is
    /// optional and falls back to defaults. CLI flags override either.
    pub fn settings(&self) -> Result<Settings, CliError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from(path)?,
            None => {
                let path = config_file_path();
                if path.exists() {
                    Settings::load_from(&path)?
                } else {
                    Settings::default()
                }
            }
        };

        if let Some(root) = &self.cache_root {
            settings = settings.with_cache_root(root.clone());
        }
        if let Some(concurrency) = self.concurrency {
            settings = settings.with_concurrency(concurrency);
        }
        if let Some(languages) = &self.languages {
            settings = settings.with_languages(parse_language_list(languages));
        }
        Ok(settings)
    }

    /// The directory the cache tree lives under.
    pub fn base_dir(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.clone(),
            None => default_base_dir(),
        }
    }

    /// Builds the application from the resolved settings and base directory.
    pub fn build_app(&self, settings: Settings) -> Result<ScrycacheApp, CliError> {
        ScrycacheApp::new(settings, self.base_dir()).map_err(CliError::from)
    }
}

/// Per-user cache location, falling back to the working directory.
pub fn default_base_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("scrycache"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Creates the multi-threaded runtime the resolver pipeline runs on.
pub fn build_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))
}
