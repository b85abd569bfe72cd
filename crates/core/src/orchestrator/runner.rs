//! Drives transfers through the full lifecycle: submit, poll until
//! settled, download, then clean up remotely.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::locker::{Locker, Transfer, TransferStatus};
use crate::searcher::SearchResult;

use super::config::TransferConfig;
use super::types::{BatchReport, TransferError, TransferOutcome};

pub struct TransferOrchestrator {
    locker: Arc<dyn Locker>,
    config: TransferConfig,
    download_dir: PathBuf,
}

impl TransferOrchestrator {
    pub fn new(locker: Arc<dyn Locker>, config: TransferConfig, download_dir: PathBuf) -> Self {
        Self {
            locker,
            config,
            download_dir,
        }
    }

    /// Run every result to completion concurrently. One failing
    /// transfer never aborts its siblings.
    pub async fn run_batch(&self, results: Vec<SearchResult>) -> BatchReport {
        let tasks = results.iter().map(|result| async {
            let title = result.display_name().to_string();
            let outcome = self.run_one(result).await;
            if let Err(e) = &outcome {
                error!(item = %title, error = %e, "Transfer failed");
            }
            TransferOutcome {
                title,
                result: outcome,
            }
        });

        let outcomes = join_all(tasks).await;
        let report = BatchReport { outcomes };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch complete"
        );
        report
    }

    /// Run a single result through the full lifecycle.
    pub async fn run_one(&self, result: &SearchResult) -> Result<(), TransferError> {
        info!(item = result.display_name(), "Submitting transfer");
        let transfer = self
            .locker
            .upload(&result.magnet)
            .await?
            .ok_or(TransferError::UploadRejected)?;

        let settled = self.poll_until_settled(transfer).await?;

        if settled.status == TransferStatus::Error {
            // Leave the failed transfer record in place for inspection.
            return Err(TransferError::RemoteFailed(settled.message));
        }

        info!(transfer = %settled.id, "Transfer finished remotely, downloading");
        match self.locker.download(&settled, &self.download_dir).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(TransferError::DownloadFailed(
                    "no downloadable content".to_string(),
                ))
            }
            Err(e) => return Err(TransferError::DownloadFailed(e.to_string())),
        }

        if !self.locker.delete(&settled, true).await? {
            return Err(TransferError::CleanupFailed(settled.id));
        }

        info!(item = result.display_name(), "Transfer complete");
        Ok(())
    }

    /// Poll the transfer listing until the transfer leaves its pending
    /// states or the optional deadline expires.
    async fn poll_until_settled(&self, transfer: Transfer) -> Result<Transfer, TransferError> {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let deadline = self
            .config
            .poll_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let mut latest = transfer;

        loop {
            let transfers = self.locker.list_transfers().await?;
            match transfers.into_iter().find(|t| t.id == latest.id) {
                Some(current) => {
                    debug!(
                        transfer = %current.id,
                        status = current.status.as_str(),
                        message = %current.message,
                        "Polled transfer"
                    );
                    latest = current;
                }
                // Listing gaps happen right after submission; keep the
                // last known snapshot and poll again.
                None => debug!(transfer = %latest.id, "Transfer missing from listing"),
            }

            if !latest.status.is_pending() {
                return Ok(latest);
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!(transfer = %latest.id, "Poll deadline reached");
                    return Err(TransferError::PollTimeout {
                        id: latest.id,
                        seconds: self.config.poll_timeout_secs.unwrap_or(0),
                    });
                }
            }

            tokio::time::sleep(interval).await;
        }
    }
}
