//! Scripted fetcher for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::searcher::{FetchError, SourceFetch};

/// Mock fetcher that serves canned bodies per URL and records every
/// call. URLs without a canned body fail as unavailable.
#[derive(Default)]
pub struct MockSource {
    responses: RwLock<HashMap<String, String>>,
    calls: RwLock<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_response(&self, url: &str, body: &str) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), body.to_string());
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl SourceFetch for MockSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.write().await.push(url.to_string());
        match self.responses.read().await.get(url) {
            Some(body) => Ok(body.clone()),
            None => Err(FetchError::Unavailable {
                url: url.to_string(),
                attempts: 3,
            }),
        }
    }
}
