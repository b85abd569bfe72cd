//! Scripted locker for tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::locker::{Locker, LockerError, Transfer, TransferStatus};

/// Mock locker with scriptable per-transfer status sequences.
///
/// Uploads are accepted by default and assigned ids `job-1`, `job-2`,
/// ... in submission order. Each `list_transfers` call advances every
/// scripted status sequence by one step; the last status repeats once a
/// sequence is exhausted. Unscripted transfers report finished.
#[derive(Default)]
pub struct MockLocker {
    upload_counter: RwLock<u64>,
    rejected_locators: RwLock<HashSet<String>>,
    status_scripts: RwLock<HashMap<String, VecDeque<TransferStatus>>>,
    hidden_polls: RwLock<HashMap<String, u32>>,
    list_calls: RwLock<u32>,
    download_failures: RwLock<HashSet<String>>,
    delete_failures: RwLock<HashSet<String>>,
    downloads: RwLock<Vec<(String, PathBuf)>>,
    deletions: RwLock<Vec<(String, bool)>>,
    uploads: RwLock<Vec<String>>,
}

impl MockLocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject future uploads of this locator.
    pub async fn reject_locator(&self, locator: &str) {
        self.rejected_locators
            .write()
            .await
            .insert(locator.to_string());
    }

    /// Script the status sequence reported for a transfer id. One entry
    /// is consumed per `list_transfers` call; the last entry repeats.
    pub async fn script_statuses(&self, id: &str, statuses: &[TransferStatus]) {
        self.status_scripts
            .write()
            .await
            .insert(id.to_string(), statuses.iter().copied().collect());
    }

    /// Hide the transfer from the listing for its first `polls` polls.
    pub async fn hide_for_polls(&self, id: &str, polls: u32) {
        self.hidden_polls.write().await.insert(id.to_string(), polls);
    }

    /// Make `download` report missing content for this transfer id.
    pub async fn fail_download(&self, id: &str) {
        self.download_failures.write().await.insert(id.to_string());
    }

    /// Make `delete` report failure for this transfer id.
    pub async fn fail_delete(&self, id: &str) {
        self.delete_failures.write().await.insert(id.to_string());
    }

    pub async fn list_call_count(&self) -> u32 {
        *self.list_calls.read().await
    }

    pub async fn uploaded_locators(&self) -> Vec<String> {
        self.uploads.read().await.clone()
    }

    pub async fn downloaded_ids(&self) -> Vec<String> {
        self.downloads
            .read()
            .await
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub async fn deletions(&self) -> Vec<(String, bool)> {
        self.deletions.read().await.clone()
    }

    fn transfer(id: &str, status: TransferStatus) -> Transfer {
        Transfer {
            id: id.to_string(),
            name: format!("content of {id}"),
            status,
            message: String::new(),
            folder_id: Some(format!("folder-{id}")),
            file_id: None,
        }
    }
}

#[async_trait]
impl Locker for MockLocker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, locator: &str) -> Result<Option<Transfer>, LockerError> {
        self.uploads.write().await.push(locator.to_string());
        if self.rejected_locators.read().await.contains(locator) {
            return Ok(None);
        }

        let mut counter = self.upload_counter.write().await;
        *counter += 1;
        let id = format!("job-{}", *counter);
        Ok(Some(Self::transfer(&id, TransferStatus::Queued)))
    }

    async fn list_transfers(&self) -> Result<Vec<Transfer>, LockerError> {
        *self.list_calls.write().await += 1;

        let mut hidden = self.hidden_polls.write().await;
        let mut scripts = self.status_scripts.write().await;
        let count = *self.upload_counter.read().await;

        let mut transfers = Vec::new();
        for n in 1..=count {
            let id = format!("job-{n}");

            if let Some(remaining) = hidden.get_mut(&id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    continue;
                }
            }

            let status = match scripts.get_mut(&id) {
                Some(script) => {
                    if script.len() > 1 {
                        script.pop_front().unwrap_or(TransferStatus::Finished)
                    } else {
                        script.front().copied().unwrap_or(TransferStatus::Finished)
                    }
                }
                None => TransferStatus::Finished,
            };
            transfers.push(Self::transfer(&id, status));
        }
        Ok(transfers)
    }

    async fn download(&self, transfer: &Transfer, dest_dir: &Path) -> Result<bool, LockerError> {
        self.downloads
            .write()
            .await
            .push((transfer.id.clone(), dest_dir.to_path_buf()));
        Ok(!self.download_failures.read().await.contains(&transfer.id))
    }

    async fn delete(&self, transfer: &Transfer, deep: bool) -> Result<bool, LockerError> {
        self.deletions
            .write()
            .await
            .push((transfer.id.clone(), deep));
        Ok(!self.delete_failures.read().await.contains(&transfer.id))
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_statuses_advance_per_list_call() {
        let locker = MockLocker::new();
        locker.upload("magnet:?xt=urn:btih:a").await.unwrap();
        locker
            .script_statuses(
                "job-1",
                &[
                    TransferStatus::Queued,
                    TransferStatus::Running,
                    TransferStatus::Finished,
                ],
            )
            .await;

        let statuses: Vec<TransferStatus> = {
            let mut out = Vec::new();
            for _ in 0..4 {
                out.push(locker.list_transfers().await.unwrap()[0].status);
            }
            out
        };
        assert_eq!(
            statuses,
            vec![
                TransferStatus::Queued,
                TransferStatus::Running,
                TransferStatus::Finished,
                TransferStatus::Finished,
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_locator() {
        let locker = MockLocker::new();
        locker.reject_locator("magnet:?xt=urn:btih:bad").await;
        assert!(locker
            .upload("magnet:?xt=urn:btih:bad")
            .await
            .unwrap()
            .is_none());
        assert!(locker
            .upload("magnet:?xt=urn:btih:good")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_hidden_polls() {
        let locker = MockLocker::new();
        locker.upload("magnet:?xt=urn:btih:a").await.unwrap();
        locker.hide_for_polls("job-1", 2).await;

        assert!(locker.list_transfers().await.unwrap().is_empty());
        assert!(locker.list_transfers().await.unwrap().is_empty());
        assert_eq!(locker.list_transfers().await.unwrap().len(), 1);
    }
}
