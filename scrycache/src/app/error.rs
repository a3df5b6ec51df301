//! Application error types.

use std::fmt;

use crate::config::ConfigError;
use crate::fetch::HttpError;

/// Errors that can occur while building the application.
///
/// Resolution itself never surfaces errors (a name that cannot be resolved
/// is `None`); only bootstrap can fail.
#[derive(Debug)]
pub enum AppError {
    /// The settings file could not be loaded.
    Config(ConfigError),

    /// The HTTP client could not be constructed.
    HttpClient(HttpError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => {
                write!(f, "Configuration error: {}", e)
            }
            AppError::HttpClient(e) => {
                write!(f, "Failed to create HTTP client: {}", e)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::HttpClient(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<HttpError> for AppError {
    fn from(e: HttpError) -> Self {
        AppError::HttpClient(e)
    }
}
