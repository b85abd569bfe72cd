//! End-to-end lifecycle tests driven through the mock locker.

use std::path::PathBuf;
use std::sync::Arc;

use harbor_core::locker::TransferStatus;
use harbor_core::orchestrator::{TransferConfig, TransferError, TransferOrchestrator};
use harbor_core::searcher::SearchResult;
use harbor_core::testing::MockLocker;

fn fast_config() -> TransferConfig {
    TransferConfig {
        poll_interval_ms: 5,
        poll_timeout_secs: None,
    }
}

fn orchestrator(locker: Arc<MockLocker>, config: TransferConfig) -> TransferOrchestrator {
    TransferOrchestrator::new(locker, config, PathBuf::from("/tmp/harbor-tests"))
}

fn result(tag: &str) -> SearchResult {
    SearchResult::from_locator(format!("magnet:?xt=urn:btih:{tag}"))
}

#[tokio::test]
async fn test_happy_path_polls_until_finished() {
    let locker = Arc::new(MockLocker::new());
    let orch = orchestrator(locker.clone(), fast_config());

    locker
        .script_statuses(
            "job-1",
            &[
                TransferStatus::Running,
                TransferStatus::Running,
                TransferStatus::Finished,
            ],
        )
        .await;

    orch.run_one(&result("aaa")).await.unwrap();

    // One listing per scripted status, none after settling.
    assert_eq!(locker.list_call_count().await, 3);
    assert_eq!(locker.downloaded_ids().await, vec!["job-1"]);
    assert_eq!(locker.deletions().await, vec![("job-1".to_string(), true)]);
}

#[tokio::test]
async fn test_rejected_upload() {
    let locker = Arc::new(MockLocker::new());
    let orch = orchestrator(locker.clone(), fast_config());
    locker.reject_locator("magnet:?xt=urn:btih:bad").await;

    let err = orch.run_one(&result("bad")).await.unwrap_err();
    assert!(matches!(err, TransferError::UploadRejected));
    assert_eq!(locker.list_call_count().await, 0);
}

#[tokio::test]
async fn test_remote_error_skips_download_and_cleanup() {
    let locker = Arc::new(MockLocker::new());
    let orch = orchestrator(locker.clone(), fast_config());
    locker
        .script_statuses("job-1", &[TransferStatus::Running, TransferStatus::Error])
        .await;

    let err = orch.run_one(&result("aaa")).await.unwrap_err();
    assert!(matches!(err, TransferError::RemoteFailed(_)));
    assert!(locker.downloaded_ids().await.is_empty());
    assert!(locker.deletions().await.is_empty());
}

#[tokio::test]
async fn test_download_failure_leaves_remote_content() {
    let locker = Arc::new(MockLocker::new());
    let orch = orchestrator(locker.clone(), fast_config());
    locker.fail_download("job-1").await;

    let err = orch.run_one(&result("aaa")).await.unwrap_err();
    assert!(matches!(err, TransferError::DownloadFailed(_)));
    assert!(locker.deletions().await.is_empty());
}

#[tokio::test]
async fn test_cleanup_failure_after_successful_download() {
    let locker = Arc::new(MockLocker::new());
    let orch = orchestrator(locker.clone(), fast_config());
    locker.fail_delete("job-1").await;

    let err = orch.run_one(&result("aaa")).await.unwrap_err();
    assert!(matches!(err, TransferError::CleanupFailed(_)));
    assert_eq!(locker.downloaded_ids().await, vec!["job-1"]);
}

#[tokio::test]
async fn test_missing_from_listing_keeps_polling() {
    let locker = Arc::new(MockLocker::new());
    let orch = orchestrator(locker.clone(), fast_config());
    locker.hide_for_polls("job-1", 2).await;

    orch.run_one(&result("aaa")).await.unwrap();

    // Two empty listings, then the finished one.
    assert_eq!(locker.list_call_count().await, 3);
}

#[tokio::test]
async fn test_poll_deadline_expires() {
    let locker = Arc::new(MockLocker::new());
    let config = TransferConfig {
        poll_interval_ms: 5,
        poll_timeout_secs: Some(0),
    };
    let orch = orchestrator(locker.clone(), config);
    locker
        .script_statuses("job-1", &[TransferStatus::Queued])
        .await;

    let err = orch.run_one(&result("aaa")).await.unwrap_err();
    assert!(matches!(err, TransferError::PollTimeout { .. }));
    assert!(locker.downloaded_ids().await.is_empty());
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let locker = Arc::new(MockLocker::new());
    let orch = orchestrator(locker.clone(), fast_config());
    locker.reject_locator("magnet:?xt=urn:btih:bbb").await;

    let report = orch
        .run_batch(vec![result("aaa"), result("bbb"), result("ccc")])
        .await;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.all_succeeded());

    // The failing item keeps its slot in the report.
    assert_eq!(report.outcomes[1].title, "magnet:?xt=urn:btih:bbb");
    assert!(report.outcomes[1].result.is_err());

    // Every locator was submitted despite the rejection.
    assert_eq!(locker.uploaded_locators().await.len(), 3);
}

#[tokio::test]
async fn test_empty_batch() {
    let locker = Arc::new(MockLocker::new());
    let orch = orchestrator(locker.clone(), fast_config());

    let report = orch.run_batch(Vec::new()).await;
    assert!(report.outcomes.is_empty());
    assert!(report.all_succeeded());
    assert_eq!(locker.list_call_count().await, 0);
}
