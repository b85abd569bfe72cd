//! Transfer orchestration: the submit, poll, download, cleanup
//! lifecycle and concurrent batch execution.

mod config;
mod runner;
mod types;

pub use config::TransferConfig;
pub use runner::TransferOrchestrator;
pub use types::{BatchReport, TransferError, TransferOutcome};
