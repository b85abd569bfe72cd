//! Types for the torrent search pipeline.

use serde::{Deserialize, Serialize};

/// A normalized search result, produced uniformly regardless of which raw
/// source shape it was parsed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title as reported by the index.
    pub title: String,
    /// Locator handed to the locker: a magnet URI or a direct URL.
    pub magnet: String,
    /// Humanized size for display (e.g. "1.5KiB"). Empty when unknown.
    pub size: String,
    /// Size in bytes (0 when the source only reports a display string).
    pub size_bytes: u64,
    /// Number of seeders.
    pub seeders: u32,
    /// Number of leechers.
    pub leechers: u32,
}

impl SearchResult {
    /// A result is usable iff it carries at least a title or a locator.
    pub fn is_usable(&self) -> bool {
        !self.title.is_empty() || !self.magnet.is_empty()
    }

    /// Wrap a direct magnet/URL locator, bypassing search entirely.
    pub fn from_locator(locator: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            magnet: locator.into(),
            size: String::new(),
            size_bytes: 0,
            seeders: 0,
            leechers: 0,
        }
    }

    /// Name used in log lines; falls back to the locator for untitled
    /// direct-input results.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.magnet
        } else {
            &self.title
        }
    }
}

/// Content category filter, mapped to the index's fixed category codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Video,
    Movie,
    Show,
    Audio,
    Porn,
    Game,
}

/// Category code meaning "all categories".
pub const WILDCARD_CATEGORY: &str = "0";

impl Category {
    /// The index's numeric category code.
    pub fn code(&self) -> &'static str {
        match self {
            Category::Video => "200",
            Category::Movie => "207",
            Category::Show => "208",
            Category::Audio => "100",
            Category::Porn => "500",
            Category::Game => "400",
        }
    }
}

/// Resolve an optional category filter to a code, defaulting to the
/// wildcard.
pub fn category_code(category: Option<Category>) -> &'static str {
    category.map(|c| c.code()).unwrap_or(WILDCARD_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_requires_title_or_magnet() {
        let empty = SearchResult {
            title: String::new(),
            magnet: String::new(),
            size: String::new(),
            size_bytes: 0,
            seeders: 0,
            leechers: 0,
        };
        assert!(!empty.is_usable());

        let titled = SearchResult {
            title: "Something".to_string(),
            ..empty.clone()
        };
        assert!(titled.is_usable());

        let linked = SearchResult {
            magnet: "magnet:?xt=urn:btih:abc".to_string(),
            ..empty
        };
        assert!(linked.is_usable());
    }

    #[test]
    fn test_from_locator() {
        let result = SearchResult::from_locator("magnet:?xt=urn:btih:abc123");
        assert!(result.is_usable());
        assert!(result.title.is_empty());
        assert_eq!(result.display_name(), "magnet:?xt=urn:btih:abc123");
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(Category::Movie.code(), "207");
        assert_eq!(Category::Show.code(), "208");
        assert_eq!(Category::Video.code(), "200");
        assert_eq!(Category::Audio.code(), "100");
        assert_eq!(Category::Porn.code(), "500");
        assert_eq!(Category::Game.code(), "400");
    }

    #[test]
    fn test_category_code_wildcard() {
        assert_eq!(category_code(None), "0");
        assert_eq!(category_code(Some(Category::Game)), "400");
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&Category::Movie).unwrap(),
            "\"movie\""
        );
        let parsed: Category = serde_json::from_str("\"show\"").unwrap();
        assert_eq!(parsed, Category::Show);
    }
}
