//! Mirror fallback resolution.
//!
//! Walks an ordered mirror list trying the structured API shape first
//! and the listing page second, returning the first non-empty result
//! set. When every mirror comes up empty the well-known fallback origin
//! gets one final API query.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::mirrors::{fallback_url, EndpointShape, Mirror};
use super::parser::{normalize, RawPayload};
use super::source::SourceFetch;
use super::types::{category_code, Category, SearchResult};

pub struct MirrorResolver {
    source: Arc<dyn SourceFetch>,
    mirrors: Vec<Mirror>,
}

impl MirrorResolver {
    pub fn new(source: Arc<dyn SourceFetch>, mirrors: Vec<Mirror>) -> Self {
        Self { source, mirrors }
    }

    /// Run a query through the mirror list, stopping at the first mirror
    /// that yields results. Exhaustion is not an error; it returns an
    /// empty set.
    pub async fn search(&self, query: &str, category: Option<Category>) -> Vec<SearchResult> {
        let code = category_code(category);

        for mirror in &self.mirrors {
            let results = self
                .try_shape(mirror, EndpointShape::Api, query, code)
                .await;
            if !results.is_empty() {
                return results;
            }

            // Some mirrors only serve the listing page.
            let results = self
                .try_shape(mirror, EndpointShape::Page, query, code)
                .await;
            if !results.is_empty() {
                return results;
            }

            debug!(mirror = %mirror.base_url, "Mirror yielded nothing, moving on");
        }

        info!(query = query, "All mirrors exhausted, trying fallback origin");
        let url = fallback_url(query, code);
        if let Some(results) = self.fetch_normalized(&url, EndpointShape::Api).await {
            if !results.is_empty() {
                return results;
            }
        }

        warn!(query = query, "No results from any mirror or the fallback origin");
        Vec::new()
    }

    async fn try_shape(
        &self,
        mirror: &Mirror,
        shape: EndpointShape,
        query: &str,
        code: &str,
    ) -> Vec<SearchResult> {
        let url = mirror.search_url(shape, query, code);
        self.fetch_normalized(&url, shape).await.unwrap_or_default()
    }

    async fn fetch_normalized(
        &self,
        url: &str,
        shape: EndpointShape,
    ) -> Option<Vec<SearchResult>> {
        let body = match self.source.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                debug!(url = url, error = %e, "Fetch failed, skipping endpoint");
                return None;
            }
        };
        let payload = match shape {
            EndpointShape::Api => RawPayload::Api(body),
            EndpointShape::Page => RawPayload::Page(body),
        };
        Some(normalize(&payload))
    }
}
