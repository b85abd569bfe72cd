pub mod config;
pub mod locker;
pub mod orchestrator;
pub mod searcher;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LockerConfig,
    SearchConfig,
};
pub use locker::{Locker, LockerError, PremiumizeClient, Transfer, TransferStatus};
pub use orchestrator::{
    BatchReport, TransferConfig, TransferError, TransferOrchestrator, TransferOutcome,
};
pub use searcher::{
    discover_mirrors, select, Category, HttpSource, Mirror, MirrorResolver, SearchResult,
    SelectionMode, SourceFetch,
};
