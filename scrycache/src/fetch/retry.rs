//! JSON fetches with per-attempt timeouts and linear backoff.
//!
//! Remote metadata lookups go through [`FetchClient::fetch_json`], which
//! retries transient failures. Each attempt has its own deadline, attempt
//! `n` is followed by a wait of `n * base_delay`, and only the last failure
//! is surfaced when every attempt is spent. Image downloads deliberately
//! bypass this layer; they are single-shot.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::http::{HttpClient, HttpError};

/// Default number of retries after the first failed attempt.
pub const DEFAULT_RETRIES: u32 = 2;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 7_000;

/// Default base backoff in milliseconds. Attempt `n` waits `n` times this.
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;

/// Fetch policy: how often to retry, how long each attempt may take, and
/// how long to back off between attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    /// Retries after the first failed attempt. `0` means a single attempt.
    pub retries: u32,

    /// Deadline for each individual attempt.
    pub timeout: Duration,

    /// Base backoff; the wait after attempt `n` is `n * base_delay`.
    pub base_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl FetchOptions {
    /// Set the retry count.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the per-attempt timeout in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    /// Set the base backoff in milliseconds.
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay = Duration::from_millis(base_delay_ms);
        self
    }

    /// Total attempts the policy allows.
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

/// Error from a fetch whose every attempt failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// All attempts failed; `source` is the failure of the last one.
    #[error("GET {url} failed after {attempts} attempt(s): {source}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        source: HttpError,
    },
}

impl FetchError {
    /// The last per-attempt failure behind this error.
    pub fn last_failure(&self) -> &HttpError {
        match self {
            FetchError::Exhausted { source, .. } => source,
        }
    }
}

/// HTTP client with retry, backoff and a per-attempt deadline.
///
/// Cheap to clone; clones share the underlying [`HttpClient`].
#[derive(Clone)]
pub struct FetchClient {
    http: Arc<dyn HttpClient>,
    options: FetchOptions,
}

impl FetchClient {
    /// Creates a fetch client with the default policy.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_options(http, FetchOptions::default())
    }

    /// Creates a fetch client with an explicit policy.
    pub fn with_options(http: Arc<dyn HttpClient>, options: FetchOptions) -> Self {
        Self { http, options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetches a URL and decodes the body as JSON.
    ///
    /// A non-success status, a transport failure, an unusable body and a
    /// blown deadline all count as a failed attempt and are retried alike.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The decoded JSON value, or [`FetchError::Exhausted`] carrying the
    /// last attempt's failure.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let attempts = self.options.attempts();
        let mut last_error: Option<HttpError> = None;

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.options.timeout, self.http.get(url)).await {
                Ok(Ok(body)) => match serde_json::from_slice::<Value>(&body) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        debug!(url = %url, attempt, error = %e, "response body is not valid JSON");
                        last_error = Some(HttpError::Transport {
                            url: url.to_string(),
                            message: format!("invalid JSON body: {}", e),
                        });
                    }
                },
                Ok(Err(e)) => {
                    debug!(url = %url, attempt, error = %e, "fetch attempt failed");
                    last_error = Some(e);
                }
                Err(_) => {
                    let timeout_ms = self.options.timeout.as_millis() as u64;
                    debug!(url = %url, attempt, timeout_ms, "fetch attempt timed out");
                    last_error = Some(HttpError::Timeout {
                        url: url.to_string(),
                        timeout_ms,
                    });
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.options.base_delay * attempt).await;
            }
        }

        let source = last_error.unwrap_or_else(|| HttpError::Transport {
            url: url.to_string(),
            message: "no fetch attempts were made".to_string(),
        });
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::http::tests::MockHttpClient;
    use super::*;

    fn fast_options() -> FetchOptions {
        FetchOptions::default()
            .with_timeout_ms(1_000)
            .with_base_delay_ms(1)
    }

    fn status(code: u16, url: &str) -> HttpError {
        HttpError::Status {
            status: code,
            url: url.to_string(),
        }
    }

    #[test]
    fn test_default_options() {
        let options = FetchOptions::default();
        assert_eq!(options.retries, 2);
        assert_eq!(options.timeout, Duration::from_millis(7_000));
        assert_eq!(options.base_delay, Duration::from_millis(500));
        assert_eq!(options.attempts(), 3);
    }

    #[test]
    fn test_zero_retries_is_one_attempt() {
        assert_eq!(FetchOptions::default().with_retries(0).attempts(), 1);
    }

    #[tokio::test]
    async fn test_fetch_json_first_attempt_success() {
        let url = "http://api/cards";
        let mock = Arc::new(MockHttpClient::new().respond_json(url, r#"{"name":"Opt"}"#));
        let client = FetchClient::with_options(mock.clone(), fast_options());

        let value = client.fetch_json(url).await.unwrap();
        assert_eq!(value["name"], "Opt");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_json_retries_until_success() {
        let url = "http://api/cards";
        let mock = Arc::new(
            MockHttpClient::new()
                .respond(url, Err(status(500, url)))
                .respond(url, Err(status(503, url)))
                .respond_json(url, r#"{"name":"Shock"}"#),
        );
        let client = FetchClient::with_options(mock.clone(), fast_options());

        let value = client.fetch_json(url).await.unwrap();
        assert_eq!(value["name"], "Shock");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_json_surfaces_last_failure() {
        let url = "http://api/cards";
        let mock = Arc::new(
            MockHttpClient::new()
                .respond(url, Err(status(500, url)))
                .respond(url, Err(status(503, url))),
        );
        let options = fast_options().with_retries(1);
        let client = FetchClient::with_options(mock.clone(), options);

        let err = client.fetch_json(url).await.unwrap_err();
        let FetchError::Exhausted { attempts, source, .. } = err;
        assert_eq!(attempts, 2);
        assert_eq!(source, status(503, url));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_json_invalid_body_is_retried() {
        let url = "http://api/cards";
        let mock = Arc::new(
            MockHttpClient::new()
                .respond(url, Ok(b"not json".to_vec()))
                .respond_json(url, r#"{"ok":true}"#),
        );
        let client = FetchClient::with_options(mock.clone(), fast_options());

        let value = client.fetch_json(url).await.unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_json_attempt_deadline() {
        let url = "http://api/cards";
        let mock = Arc::new(
            MockHttpClient::new()
                .with_delay(Duration::from_millis(50))
                .respond_json(url, r#"{"ok":true}"#),
        );
        let options = FetchOptions::default()
            .with_retries(0)
            .with_timeout_ms(5)
            .with_base_delay_ms(1);
        let client = FetchClient::with_options(mock, options);

        let err = client.fetch_json(url).await.unwrap_err();
        assert!(matches!(
            err.last_failure(),
            HttpError::Timeout { timeout_ms: 5, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_json_backoff_grows_per_attempt() {
        let url = "http://api/cards";
        let mock = Arc::new(MockHttpClient::new());
        let options = FetchOptions::default()
            .with_retries(2)
            .with_timeout_ms(1_000)
            .with_base_delay_ms(20);
        let client = FetchClient::with_options(mock, options);

        let started = tokio::time::Instant::now();
        let _ = client.fetch_json(url).await;
        // Waits of 20ms and 40ms separate the three attempts.
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
