//! Mirror catalog and URL construction.
//!
//! The index is reached through a rotating set of community mirrors.
//! Mirrors can be pinned in configuration or discovered at runtime from
//! a public proxy listing.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::{debug, warn};

use super::source::SourceFetch;

/// Public listing of known index mirrors.
pub const PROXY_LIST_URL: &str = "https://piratebayproxy.info/";

/// Last-resort origin queried when every mirror comes up empty.
pub const FALLBACK_ORIGIN: &str = "https://apibay.org";

/// Which of the two query endpoints a mirror is asked through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointShape {
    /// Structured JSON endpoint.
    Api,
    /// Legacy HTML listing page.
    Page,
}

/// One index mirror, identified by its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    pub base_url: String,
}

impl Mirror {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Build the query URL for this mirror in the given shape.
    pub fn search_url(&self, shape: EndpointShape, query: &str, category_code: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let encoded = urlencoding::encode(query);
        match shape {
            EndpointShape::Api => {
                format!("{base}/newapi/q.php?q={encoded}&cat={category_code}")
            }
            EndpointShape::Page => format!("{base}/s/?q={encoded}&cat={category_code}"),
        }
    }
}

/// Query URL against the fallback origin, which only speaks the API shape.
pub fn fallback_url(query: &str, category_code: &str) -> String {
    format!(
        "{FALLBACK_ORIGIN}/q.php?q={}&cat={category_code}",
        urlencoding::encode(query)
    )
}

static ANCHOR_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<a[^>]*href="([^"]+)""#).unwrap());
static PROXY_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<table[^>]*id="searchResult"[^>]*>(.*?)</table>"#).unwrap());

/// Discover live mirrors from a proxy listing page.
///
/// Discovery failure is not fatal: callers fall back to configured
/// mirrors or the fallback origin.
pub async fn discover_mirrors(source: &dyn SourceFetch, listing_url: &str) -> Vec<Mirror> {
    let body = match source.fetch(listing_url).await {
        Ok(body) => body,
        Err(e) => {
            warn!(url = listing_url, error = %e, "Mirror discovery failed, continuing without discovered mirrors");
            return Vec::new();
        }
    };

    let mirrors = parse_proxy_list(&body);
    debug!(count = mirrors.len(), "Discovered mirrors");
    mirrors
}

/// Extract mirror base URLs from the proxy listing markup.
pub fn parse_proxy_list(body: &str) -> Vec<Mirror> {
    let Some(table) = PROXY_TABLE_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return Vec::new();
    };

    // Header row first, then one mirror per row; the row's first
    // anchor points at the mirror itself.
    table
        .split("<tr")
        .skip(2)
        .filter_map(|row| ANCHOR_HREF_RE.captures(row))
        .filter_map(|c| c.get(1))
        .map(|m| Mirror::new(m.as_str().trim_end_matches('/')))
        .collect()
}
