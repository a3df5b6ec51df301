//! Remote access: the HTTP abstraction and the retrying JSON fetcher.

mod http;
mod retry;

pub use http::{HttpClient, HttpError, ReqwestClient};
pub use retry::{
    FetchClient, FetchError, FetchOptions, DEFAULT_BASE_DELAY_MS, DEFAULT_RETRIES,
    DEFAULT_TIMEOUT_MS,
};

#[cfg(test)]
pub use http::tests::MockHttpClient;
