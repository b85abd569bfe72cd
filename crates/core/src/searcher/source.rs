//! Raw HTTP fetching with bounded retry.
//!
//! Mirrors are flaky: timeouts and refused connections are expected and
//! retried a fixed number of times with a short pause in between. Anything
//! else aborts the call immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, info};

/// Pause between retry attempts.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Errors from a raw fetch. Neither variant is fatal to a whole query;
/// the resolver skips the mirror and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Retry budget exhausted on transient failures. Mirror presumed down.
    #[error("connection to {url} failed after {attempts} attempts")]
    Unavailable { url: String, attempts: u32 },

    /// Unexpected transport error; not retried.
    #[error("transport error fetching {url}: {reason}")]
    Fatal { url: String, reason: String },
}

/// Seam for raw payload fetching, so the resolver can be driven by a mock.
#[async_trait]
pub trait SourceFetch: Send + Sync {
    /// Fetch the body at `url`, retrying transient failures.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Production fetcher backed by a shared reqwest client.
pub struct HttpSource {
    client: Client,
    retries: u32,
}

impl HttpSource {
    /// Create a fetcher with the given per-request timeout and retry budget.
    pub fn new(timeout_secs: u32, retries: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, retries }
    }
}

#[async_trait]
impl SourceFetch for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        for _ in 0..self.retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().await.map_err(|e| FetchError::Fatal {
                            url: url.to_string(),
                            reason: e.to_string(),
                        });
                    }
                    // Soft failure; burns one attempt.
                    debug!(url = url, status = %status, "Index returned non-success status, site problems?");
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    tokio::time::sleep(RETRY_PAUSE).await;
                }
                Err(e) => {
                    error!(url = url, error = %e, "Unexpected transport error, aborting request");
                    return Err(FetchError::Fatal {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(url = url, "Connection failed, site probably down");
        Err(FetchError::Unavailable {
            url: url.to_string(),
            attempts: self.retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::Unavailable {
            url: "https://example.org".to_string(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "connection to https://example.org failed after 3 attempts"
        );

        let err = FetchError::Fatal {
            url: "https://example.org".to_string(),
            reason: "builder error".to_string(),
        };
        assert!(err.to_string().contains("transport error"));
    }
}
