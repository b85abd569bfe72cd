use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harbor_core::{
    discover_mirrors, load_config, select, validate_config, Category, Config, HttpSource, Locker,
    Mirror, MirrorResolver, PremiumizeClient, SearchResult, SelectionMode, SourceFetch,
    TransferOrchestrator,
};

/// Search torrent indexes and transfer results through a remote locker.
#[derive(Debug, Parser)]
#[command(name = "harbor", version, about)]
struct Args {
    /// Search terms, or a direct magnet/URL locator.
    #[arg(required = true)]
    search: Vec<String>,

    /// Directory downloads land in.
    #[arg(short = 'd', long, default_value = ".")]
    download_dir: PathBuf,

    /// Restrict the search to one content category.
    #[arg(short = 't', long = "type", value_enum)]
    content_type: Option<CategoryArg>,

    /// Locker API key, or a path to a file holding it.
    #[arg(short = 'a', long)]
    auth: Option<String>,

    /// Configuration file path.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// No prompts; take the top result and only log warnings.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose logging.
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CategoryArg {
    Video,
    Movie,
    Show,
    Audio,
    Porn,
    Game,
}

impl From<CategoryArg> for Category {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Video => Category::Video,
            CategoryArg::Movie => Category::Movie,
            CategoryArg::Show => Category::Show,
            CategoryArg::Audio => Category::Audio,
            CategoryArg::Porn => Category::Porn,
            CategoryArg::Game => Category::Game,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args);

    match run(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Returns `Ok(true)` when every selected transfer completed.
async fn run(args: Args) -> Result<bool> {
    let mut config = load_configuration(&args)?;

    if let Some(auth) = &args.auth {
        config.locker.api_key = resolve_api_key(auth)?;
    }
    validate_config(&config).context("Configuration validation failed")?;

    tokio::fs::create_dir_all(&args.download_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create download directory {:?}",
                args.download_dir
            )
        })?;

    let source: Arc<dyn SourceFetch> = Arc::new(HttpSource::new(
        config.search.timeout_secs,
        config.search.retries,
    ));

    let query = args.search.join(" ");
    let results = gather_results(&args, &config, &query, Arc::clone(&source)).await;
    if results.is_empty() {
        warn!("No results for '{}'", query);
        return Ok(false);
    }

    // The interactive prompt blocks on stdin, so it runs off the
    // async runtime.
    let selected = if args.quiet {
        select(results, SelectionMode::Automatic).context("Selection failed")?
    } else {
        tokio::task::spawn_blocking(move || select(results, SelectionMode::Interactive))
            .await
            .context("Selection task panicked")?
            .context("Selection failed")?
    };
    if selected.is_empty() {
        warn!("Nothing selected");
        return Ok(false);
    }

    let locker: Arc<dyn Locker> = Arc::new(PremiumizeClient::new(config.locker.clone()));
    let orchestrator = TransferOrchestrator::new(
        Arc::clone(&locker),
        config.transfer.clone(),
        args.download_dir.clone(),
    );

    let report = tokio::select! {
        report = orchestrator.run_batch(selected) => report,
        _ = shutdown_signal() => {
            warn!("Interrupted, abandoning in-flight transfers");
            locker.close().await;
            return Ok(false);
        }
    };

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => info!("Done: {}", outcome.title),
            Err(e) => error!("Failed: {}: {}", outcome.title, e),
        }
    }
    locker.close().await;

    Ok(report.all_succeeded())
}

fn load_configuration(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Ok(load_config(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?)
        }
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Loading configuration from {:?}", default_path);
                Ok(load_config(&default_path)
                    .with_context(|| format!("Failed to load config from {:?}", default_path))?)
            } else {
                debug!("No configuration file, using defaults");
                Ok(Config::default())
            }
        }
    }
}

fn default_config_path() -> PathBuf {
    std::env::var("HARBOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("harbor.toml"))
}

/// The auth argument is either the key itself or a path to a file
/// holding it on the first line.
fn resolve_api_key(auth: &str) -> Result<String> {
    let path = PathBuf::from(auth);
    if path.is_file() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read key file {:?}", path))?;
        let key = content.lines().next().unwrap_or("").trim().to_string();
        if key.is_empty() {
            anyhow::bail!("Key file {:?} is empty", path);
        }
        return Ok(key);
    }
    Ok(auth.to_string())
}

/// Resolve the query to transferable results: direct locators skip the
/// search entirely, everything else goes through the mirror list.
async fn gather_results(
    args: &Args,
    config: &Config,
    query: &str,
    source: Arc<dyn SourceFetch>,
) -> Vec<SearchResult> {
    if query.starts_with("magnet:?") || query.starts_with("http") {
        debug!("Direct locator given, skipping search");
        return vec![SearchResult::from_locator(query)];
    }

    let mut mirrors: Vec<Mirror> = config
        .search
        .mirrors
        .iter()
        .map(Mirror::new)
        .collect();
    if mirrors.is_empty() {
        info!("Discovering mirrors from {}", config.search.proxy_list_url);
        mirrors = discover_mirrors(source.as_ref(), &config.search.proxy_list_url).await;
    }

    let resolver = MirrorResolver::new(source, mirrors);
    resolver
        .search(query, args.content_type.map(Category::from))
        .await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
