//! Transfer lifecycle outcomes and errors.

use thiserror::Error;

use crate::locker::LockerError;

#[derive(Debug, Error)]
pub enum TransferError {
    /// The locker refused the submission.
    #[error("Upload rejected by locker")]
    UploadRejected,

    /// The transfer reached a terminal error state on the service side.
    #[error("Transfer failed remotely: {0}")]
    RemoteFailed(String),

    /// The finished content could not be fetched locally.
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// The transfer completed but remote cleanup did not.
    #[error("Cleanup failed: {0}")]
    CleanupFailed(String),

    /// The transfer stayed pending past the configured deadline.
    #[error("Transfer {id} still pending after {seconds}s")]
    PollTimeout { id: String, seconds: u64 },

    #[error(transparent)]
    Locker(#[from] LockerError),
}

/// The result of running one transfer end to end.
#[derive(Debug)]
pub struct TransferOutcome {
    /// Display name of the item that was transferred.
    pub title: String,
    pub result: Result<(), TransferError>,
}

/// Aggregated results of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<TransferOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let report = BatchReport {
            outcomes: vec![
                TransferOutcome {
                    title: "a".to_string(),
                    result: Ok(()),
                },
                TransferOutcome {
                    title: "b".to_string(),
                    result: Err(TransferError::UploadRejected),
                },
                TransferOutcome {
                    title: "c".to_string(),
                    result: Ok(()),
                },
            ],
        };
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());
    }

    #[test]
    fn test_empty_report_succeeds() {
        assert!(BatchReport::default().all_succeeded());
    }
}
