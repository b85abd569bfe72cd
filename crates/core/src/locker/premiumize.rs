//! Premiumize.me locker client.
//!
//! Thin wrapper over the Premiumize REST API. All endpoints return a
//! `status` field; anything other than `"success"` is surfaced as an
//! API error except for upload, where rejection is an expected outcome.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::LockerConfig;

use super::types::{Locker, LockerError, Transfer, TransferStatus};

pub struct PremiumizeClient {
    client: Client,
    config: LockerConfig,
}

#[derive(Debug, Deserialize)]
struct CreateTransferResponse {
    status: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransferListResponse {
    status: String,
    #[serde(default)]
    transfers: Vec<TransferEntry>,
}

#[derive(Debug, Deserialize)]
struct TransferEntry {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    folder_id: Option<String>,
    #[serde(default)]
    file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FolderListResponse {
    status: String,
    #[serde(default)]
    content: Vec<FolderItem>,
}

#[derive(Debug, Deserialize)]
struct FolderItem {
    id: String,
    name: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemDetailsResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlainResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Fold a service status string into the canonical lifecycle.
///
/// Unknown strings count as queued; the poll deadline bounds how long a
/// transfer can sit in an unrecognized state.
fn fold_status(raw: &str) -> TransferStatus {
    match raw {
        "waiting" | "queued" => TransferStatus::Queued,
        "running" => TransferStatus::Running,
        "finished" | "seeding" => TransferStatus::Finished,
        "error" | "banned" | "timeout" | "deleted" => TransferStatus::Error,
        other => {
            debug!(status = other, "Unrecognized transfer status, treating as queued");
            TransferStatus::Queued
        }
    }
}

/// Join a remote-supplied name under `prefix`.
///
/// Names are opaque service data and must stay a single path component:
/// anything empty, dot-only, or containing a separator is rejected so a
/// hostile name cannot escape the destination directory.
fn safe_child_path(prefix: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    if name.contains('/') || name.contains('\\') {
        return None;
    }
    Some(prefix.join(name))
}

impl PremiumizeClient {
    pub fn new(config: LockerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_transport(e: reqwest::Error) -> LockerError {
        if e.is_timeout() {
            LockerError::Timeout
        } else if e.is_connect() {
            LockerError::ConnectionFailed(e.to_string())
        } else {
            LockerError::ApiError(e.to_string())
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, LockerError> {
        let mut query: Vec<(&str, &str)> = vec![("apikey", &self.config.api_key)];
        query.extend_from_slice(params);

        let response = self
            .client
            .get(self.url(path))
            .query(&query)
            .send()
            .await
            .map_err(Self::map_transport)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LockerError::AuthenticationFailed);
        }

        response
            .json()
            .await
            .map_err(|e| LockerError::ApiError(e.to_string()))
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, LockerError> {
        let mut form: Vec<(&str, &str)> = vec![("apikey", &self.config.api_key)];
        form.extend_from_slice(params);

        let response = self
            .client
            .post(self.url(path))
            .form(&form)
            .send()
            .await
            .map_err(Self::map_transport)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LockerError::AuthenticationFailed);
        }

        response
            .json()
            .await
            .map_err(|e| LockerError::ApiError(e.to_string()))
    }

    /// Collect download links for every file under `folder_id`,
    /// walking subfolders iteratively. Each file keeps its relative
    /// path inside the remote folder tree.
    async fn collect_folder_files(
        &self,
        folder_id: &str,
    ) -> Result<Vec<(PathBuf, String)>, LockerError> {
        let mut files = Vec::new();
        let mut pending = vec![(folder_id.to_string(), PathBuf::new())];

        while let Some((folder, prefix)) = pending.pop() {
            let listing: FolderListResponse =
                self.get("folder/list", &[("id", &folder)]).await?;
            if listing.status != "success" {
                return Err(LockerError::ApiError(format!(
                    "folder/list returned status {}",
                    listing.status
                )));
            }
            for item in listing.content {
                let Some(path) = safe_child_path(&prefix, &item.name) else {
                    warn!(name = %item.name, "Remote item name is unsafe, skipping");
                    continue;
                };
                match item.item_type.as_str() {
                    "folder" => pending.push((item.id, path)),
                    "file" => {
                        if let Some(link) = item.link {
                            files.push((path, link));
                        } else {
                            warn!(file = %item.name, "File has no download link, skipping");
                        }
                    }
                    other => debug!(item_type = other, "Ignoring unknown folder item"),
                }
            }
        }

        Ok(files)
    }

    async fn download_file(&self, path: &Path, link: &str, dest_dir: &Path) -> Result<(), LockerError> {
        let dest = dest_dir.join(path);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(file = %path.display(), dest = %dest.display(), "Downloading file");

        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(Self::map_transport)?;
        if !response.status().is_success() {
            return Err(LockerError::DownloadFailed(format!(
                "{}: HTTP {}",
                path.display(),
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(&dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LockerError::DownloadFailed(e.to_string()))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Locker for PremiumizeClient {
    fn name(&self) -> &str {
        "premiumize"
    }

    async fn upload(&self, locator: &str) -> Result<Option<Transfer>, LockerError> {
        let response: CreateTransferResponse = self
            .post_form("transfer/create", &[("src", locator)])
            .await?;

        if response.status != "success" {
            warn!(
                status = %response.status,
                message = response.message.as_deref().unwrap_or(""),
                "Upload rejected by locker"
            );
            return Ok(None);
        }

        let id = response
            .id
            .ok_or_else(|| LockerError::ApiError("transfer/create returned no id".to_string()))?;
        info!(id = %id, "Transfer submitted");

        Ok(Some(Transfer {
            id,
            name: response.name.unwrap_or_default(),
            status: TransferStatus::Queued,
            message: "just submitted".to_string(),
            folder_id: None,
            file_id: None,
        }))
    }

    async fn list_transfers(&self) -> Result<Vec<Transfer>, LockerError> {
        let response: TransferListResponse = self.get("transfer/list", &[]).await?;
        if response.status != "success" {
            return Err(LockerError::ApiError(format!(
                "transfer/list returned status {}",
                response.status
            )));
        }

        Ok(response
            .transfers
            .into_iter()
            .map(|entry| Transfer {
                status: fold_status(&entry.status),
                id: entry.id,
                name: entry.name,
                message: entry.message.unwrap_or_default(),
                folder_id: entry.folder_id,
                file_id: entry.file_id,
            })
            .collect())
    }

    async fn download(&self, transfer: &Transfer, dest_dir: &Path) -> Result<bool, LockerError> {
        let files = if let Some(folder_id) = &transfer.folder_id {
            self.collect_folder_files(folder_id).await?
        } else if let Some(file_id) = &transfer.file_id {
            let details: ItemDetailsResponse =
                self.get("item/details", &[("id", file_id)]).await?;
            let name = details.name.unwrap_or_else(|| transfer.name.clone());
            match (safe_child_path(Path::new(""), &name), details.link) {
                (Some(path), Some(link)) => vec![(path, link)],
                (None, _) => {
                    warn!(name = %name, "Remote file name is unsafe, skipping");
                    Vec::new()
                }
                (_, None) => Vec::new(),
            }
        } else {
            Vec::new()
        };

        if files.is_empty() {
            warn!(transfer = %transfer.id, "No downloadable content for transfer");
            return Ok(false);
        }

        info!(transfer = %transfer.id, files = files.len(), "Downloading transfer content");
        for (path, link) in &files {
            self.download_file(path, link, dest_dir).await?;
        }
        Ok(true)
    }

    async fn delete(&self, transfer: &Transfer, deep: bool) -> Result<bool, LockerError> {
        let response: PlainResponse = self
            .post_form("transfer/delete", &[("id", &transfer.id)])
            .await?;
        if response.status != "success" {
            warn!(
                transfer = %transfer.id,
                message = response.message.as_deref().unwrap_or(""),
                "Failed to delete transfer record"
            );
            return Ok(false);
        }

        if !deep {
            return Ok(true);
        }

        // Deep delete also drops the stored content.
        let content: Option<(&str, &str)> = match (&transfer.folder_id, &transfer.file_id) {
            (Some(folder_id), _) => Some(("folder/delete", folder_id.as_str())),
            (None, Some(file_id)) => Some(("item/delete", file_id.as_str())),
            (None, None) => None,
        };
        let Some((path, id)) = content else {
            return Ok(true);
        };

        let response: PlainResponse = self.post_form(path, &[("id", id)]).await?;
        if response.status != "success" {
            warn!(transfer = %transfer.id, "Failed to delete stored content");
            return Ok(false);
        }
        Ok(true)
    }

    async fn close(&self) {
        debug!("Premiumize client closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_status_known() {
        assert_eq!(fold_status("waiting"), TransferStatus::Queued);
        assert_eq!(fold_status("queued"), TransferStatus::Queued);
        assert_eq!(fold_status("running"), TransferStatus::Running);
        assert_eq!(fold_status("finished"), TransferStatus::Finished);
        assert_eq!(fold_status("seeding"), TransferStatus::Finished);
        assert_eq!(fold_status("error"), TransferStatus::Error);
        assert_eq!(fold_status("banned"), TransferStatus::Error);
        assert_eq!(fold_status("timeout"), TransferStatus::Error);
        assert_eq!(fold_status("deleted"), TransferStatus::Error);
    }

    #[test]
    fn test_fold_status_unknown_is_queued() {
        assert_eq!(fold_status("something-new"), TransferStatus::Queued);
        assert_eq!(fold_status(""), TransferStatus::Queued);
    }

    #[test]
    fn test_safe_child_path_builds_nested_paths() {
        assert_eq!(
            safe_child_path(Path::new(""), "Season 1"),
            Some(PathBuf::from("Season 1"))
        );
        assert_eq!(
            safe_child_path(Path::new("Season 1"), "e01.mkv"),
            Some(PathBuf::from("Season 1/e01.mkv"))
        );
    }

    #[test]
    fn test_safe_child_path_keeps_same_names_apart() {
        let disc1 = safe_child_path(Path::new("disc1"), "track01.flac").unwrap();
        let disc2 = safe_child_path(Path::new("disc2"), "track01.flac").unwrap();
        assert_ne!(disc1, disc2);
    }

    #[test]
    fn test_safe_child_path_rejects_unsafe_names() {
        assert_eq!(safe_child_path(Path::new(""), ""), None);
        assert_eq!(safe_child_path(Path::new(""), "."), None);
        assert_eq!(safe_child_path(Path::new(""), ".."), None);
        assert_eq!(safe_child_path(Path::new("sub"), "../../etc/passwd"), None);
        assert_eq!(safe_child_path(Path::new(""), "a/b"), None);
        assert_eq!(safe_child_path(Path::new(""), "a\\b"), None);
    }

    #[test]
    fn test_transfer_list_deserialization() {
        let body = r#"{
            "status": "success",
            "transfers": [
                {"id": "t1", "name": "thing", "status": "running", "message": "42% done", "folder_id": null, "file_id": null},
                {"id": "t2", "name": "done", "status": "finished", "folder_id": "f9"}
            ]
        }"#;
        let parsed: TransferListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.transfers.len(), 2);
        assert_eq!(parsed.transfers[0].message.as_deref(), Some("42% done"));
        assert_eq!(parsed.transfers[1].folder_id.as_deref(), Some("f9"));
    }
}
