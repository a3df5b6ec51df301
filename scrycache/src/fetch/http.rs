//! HTTP client abstraction for testability.
//!
//! Every remote interaction goes through [`HttpClient`], so resolution logic
//! can be exercised against scripted responses without a network. The real
//! implementation is a thin wrapper over an async `reqwest` client.

use std::sync::Arc;

use thiserror::Error;

use crate::storage::BoxFuture;

/// User agent sent with every request, as the remote API requires.
const USER_AGENT: &str = concat!("scrycache/", env!("CARGO_PKG_VERSION"));

/// Errors from a single HTTP request.
///
/// `Clone` so scripted test clients can replay a prepared error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The request failed below the HTTP layer, or the body was unusable.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The attempt hit its deadline before a response arrived.
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
}

/// Trait for HTTP GET operations.
///
/// Implementations resolve to the response body only for success statuses;
/// anything else is an [`HttpError`]. The trait is dyn-compatible so the
/// whole component graph can share one `Arc<dyn HttpClient>`.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error for transport failures and
    /// non-success statuses.
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, HttpError>>;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, HttpError>> {
        (**self).get(url)
    }
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the crate user agent and a conservative
    /// whole-request deadline.
    ///
    /// The deadline matters for image downloads, which are single-shot; JSON
    /// fetches are cut shorter by the per-attempt timeout in the retry layer.
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| HttpError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, HttpError>> {
        let url = url.to_string();
        let client = self.client.clone();
        Box::pin(async move {
            let response = client.get(&url).send().await.map_err(|e| {
                HttpError::Transport {
                    url: url.clone(),
                    message: e.to_string(),
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(HttpError::Status {
                    status: status.as_u16(),
                    url,
                });
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| HttpError::Transport {
                    url,
                    message: format!("failed to read response body: {}", e),
                })
        })
    }
}
