use serde::{Deserialize, Serialize};

use crate::orchestrator::TransferConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub locker: LockerConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Public listing the mirror set is discovered from.
    #[serde(default = "default_proxy_list_url")]
    pub proxy_list_url: String,
    /// Pinned mirrors tried before any discovered ones.
    #[serde(default)]
    pub mirrors: Vec<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u32,
    /// Attempts per URL before a mirror is presumed down.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            proxy_list_url: default_proxy_list_url(),
            mirrors: Vec::new(),
            timeout_secs: default_search_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_proxy_list_url() -> String {
    crate::searcher::PROXY_LIST_URL.to_string()
}

fn default_search_timeout() -> u32 {
    5
}

fn default_retries() -> u32 {
    3
}

/// Locker service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockerConfig {
    /// API key; may also be supplied on the command line.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_locker_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_locker_timeout")]
    pub timeout_secs: u32,
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_locker_base_url(),
            timeout_secs: default_locker_timeout(),
        }
    }
}

fn default_locker_base_url() -> String {
    "https://www.premiumize.me/api".to_string()
}

fn default_locker_timeout() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search.retries, 3);
        assert_eq!(config.search.timeout_secs, 5);
        assert!(config.search.mirrors.is_empty());
        assert!(config.locker.api_key.is_empty());
        assert_eq!(config.locker.base_url, "https://www.premiumize.me/api");
        assert_eq!(config.transfer.poll_interval_ms, 2000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[locker]
api_key = "k3y"

[search]
mirrors = ["https://pinned.example"]
"#,
        )
        .unwrap();
        assert_eq!(config.locker.api_key, "k3y");
        assert_eq!(config.locker.timeout_secs, 30);
        assert_eq!(config.search.mirrors, vec!["https://pinned.example"]);
        assert_eq!(config.search.retries, 3);
    }
}
