//! Transport seam between repository resolution and the network.

use std::time::Duration;

use crate::error::{RepositoryError, RepositoryResult};

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Synchronous HTTP GET, the only transport operation repository
/// resolution needs.
///
/// [`Repository`](crate::Repository) is generic over this trait, so tests
/// drive the full resolution chain against an in-memory client serving
/// canned responses instead of a live server.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Transport`] for a non-success status and
    /// [`RepositoryError::Request`] when the request fails before a status
    /// is available.
    fn get(&self, url: &str) -> RepositoryResult<Vec<u8>>;
}

/// Production transport backed by a blocking `reqwest` client.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Create a client with the default request timeout.
    pub fn new() -> RepositoryResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> RepositoryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::Client(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> RepositoryResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RepositoryError::Request {
                path: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Transport {
                path: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| RepositoryError::Request {
                path: url.to_string(),
                reason: format!("failed to read response: {}", e),
            })
    }
}
