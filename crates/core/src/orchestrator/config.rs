//! Transfer orchestration settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Pause between transfer list polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on how long one transfer may stay pending. `None`
    /// polls forever.
    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_secs: None,
        }
    }
}
