//! Error types for CLI operations.

use std::error::Error;
use std::fmt;

use scrycache::AppError;

/// Errors that can occur while running a CLI command.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, parsed, or saved.
    Config(String),
    /// Command input was missing or could not be read.
    Input(String),
    /// The application could not be assembled.
    App(AppError),
    /// Deck processing aborted before every entry was handled.
    Batch(String),
    /// The async runtime could not be created.
    Runtime(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Input(msg) => write!(f, "Invalid input: {}", msg),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Batch(msg) => write!(f, "Deck processing failed: {}", msg),
            CliError::Runtime(msg) => write!(f, "Failed to start async runtime: {}", msg),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::App(e) => Some(e),
            _ => None,
        }
    }
}

impl From<scrycache::config::ConfigError> for CliError {
    fn from(e: scrycache::config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrycache::config::ConfigError;

    #[test]
    fn test_display_labels_each_variant() {
        let config = CliError::from(ConfigError::UnknownKey("network.bogus".to_string()));
        assert!(config.to_string().starts_with("Configuration error:"));
        assert!(config.to_string().contains("network.bogus"));

        let input = CliError::Input("decklist is empty".to_string());
        assert_eq!(input.to_string(), "Invalid input: decklist is empty");

        let batch = CliError::Batch("worker panicked".to_string());
        assert!(batch.to_string().starts_with("Deck processing failed:"));
    }

    #[test]
    fn test_app_errors_keep_their_source() {
        let app = CliError::from(AppError::Config(ConfigError::UnknownKey(
            "cache.bogus".to_string(),
        )));
        assert!(app.source().is_some());
        assert!(app.to_string().contains("cache.bogus"));
    }
}
