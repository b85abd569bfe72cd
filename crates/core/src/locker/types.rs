//! Types for remote locker services.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockerError {
    #[error("Failed to connect to locker service: {0}")]
    ConnectionFailed(String),

    #[error("Locker authentication failed")]
    AuthenticationFailed,

    #[error("Locker API error: {0}")]
    ApiError(String),

    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Locker request timed out")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Canonical lifecycle states of a remote transfer. Service-specific
/// status strings are folded into these four.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Queued,
    Running,
    Finished,
    Error,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Queued => "queued",
            TransferStatus::Running => "running",
            TransferStatus::Finished => "finished",
            TransferStatus::Error => "error",
        }
    }

    /// Whether the transfer is still in flight and worth polling.
    pub fn is_pending(&self) -> bool {
        matches!(self, TransferStatus::Queued | TransferStatus::Running)
    }
}

/// A transfer tracked by the locker service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// Service-assigned transfer id.
    pub id: String,
    /// Display name, usually the torrent name.
    pub name: String,
    pub status: TransferStatus,
    /// Last progress/status message reported by the service.
    pub message: String,
    /// Target folder once the transfer materialized as a folder.
    pub folder_id: Option<String>,
    /// Target file once the transfer materialized as a single file.
    pub file_id: Option<String>,
}

/// A remote locker service that ingests a locator, fetches the content
/// on its side, and serves it back over HTTP.
#[async_trait]
pub trait Locker: Send + Sync {
    fn name(&self) -> &str;

    /// Submit a locator. `Ok(None)` means the service rejected the
    /// submission without a transport failure.
    async fn upload(&self, locator: &str) -> Result<Option<Transfer>, LockerError>;

    /// List all transfers currently tracked by the service.
    async fn list_transfers(&self) -> Result<Vec<Transfer>, LockerError>;

    /// Download the finished transfer's content into `dest_dir`.
    /// `Ok(false)` means the content could not be located remotely.
    async fn download(&self, transfer: &Transfer, dest_dir: &Path) -> Result<bool, LockerError>;

    /// Delete the transfer record and, when `deep`, the stored content.
    async fn delete(&self, transfer: &Transfer, deep: bool) -> Result<bool, LockerError>;

    /// Release any underlying resources.
    async fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_pending() {
        assert!(TransferStatus::Queued.is_pending());
        assert!(TransferStatus::Running.is_pending());
        assert!(!TransferStatus::Finished.is_pending());
        assert!(!TransferStatus::Error.is_pending());
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(TransferStatus::Queued.as_str(), "queued");
        assert_eq!(TransferStatus::Error.as_str(), "error");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TransferStatus::Finished).unwrap(),
            "\"finished\""
        );
        let parsed: TransferStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(parsed, TransferStatus::Running);
    }
}
