//! Matchday Daemon - Background synchronization service
//!
//! This binary runs as a user service and handles:
//! - Periodic sync of news and transfers with the remote API
//! - Retry backoff after failed runs
//! - Logging of new-item notifications and data-changed signals
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! The daemon opens the local database, wires the SQLite and HTTP adapters
//! into one sync engine per collection, and hands the orchestrator to a
//! [`SyncScheduler`]. The scheduler loop is controlled by a
//! `CancellationToken` that is triggered on receipt of SIGTERM or SIGINT.
//! With `--once` a single orchestrated run is performed instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use matchday_cache::{
    DatabasePool, SqliteEntityStore, SqliteReadingState, SqliteSearchIndex, SqliteVersionCursor,
};
use matchday_core::config::Config;
use matchday_core::domain::{Collection, NewsArticle, Transfer};
use matchday_remote::{ApiClient, HttpChangeSource};
use matchday_sync::{
    ChangeBroadcaster, ChangeListSyncEngine, CollectionSync, RunOutcome, SyncOptions,
    SyncOrchestrator, SyncRunner, SyncScheduler,
};

mod notifier;

use notifier::TracingNotifier;

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "matchdayd", version, about = "Matchday background sync daemon")]
struct Cli {
    /// Use alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single sync and exit
    #[arg(long)]
    once: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

/// Filter directive used when `RUST_LOG` is not set
fn log_filter(configured_level: &str, verbose: u8) -> String {
    match verbose {
        0 => configured_level.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_tracing(filter: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}

/// Loads and validates the configuration
///
/// An explicitly given path must be readable; the default path falls back
/// to built-in defaults when missing.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default(&Config::default_path()),
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration: {}", details.join("; "));
    }

    Ok(config)
}

// ============================================================================
// DaemonService
// ============================================================================

/// Main daemon service that wires adapters and drives synchronization
struct DaemonService {
    /// Validated application configuration
    config: Config,
    /// SQLite pool shared by every adapter
    db_pool: DatabasePool,
    /// Orchestrator over every collection engine
    orchestrator: Arc<SyncOrchestrator>,
    /// Data-changed fan-out for observers
    broadcaster: ChangeBroadcaster,
    /// Token for signalling graceful shutdown to all async tasks
    shutdown: CancellationToken,
}

impl DaemonService {
    /// Creates a new DaemonService
    ///
    /// Opens the database, seeds notification defaults and builds one sync
    /// engine per collection.
    async fn new(config: Config, shutdown: CancellationToken) -> Result<Self> {
        let db_pool = DatabasePool::from_config(&config.storage)
            .await
            .context("Failed to open database")?;
        let pool = db_pool.pool().clone();

        let reading_state = Arc::new(SqliteReadingState::new(pool.clone()));
        reading_state
            .seed_notification_defaults(&config.notifications)
            .await
            .context("Failed to seed notification preferences")?;

        let client = ApiClient::new(&config.remote).context("Failed to build HTTP client")?;
        let remote = Arc::new(HttpChangeSource::new(client));
        let cursor = Arc::new(SqliteVersionCursor::new(pool.clone()));
        let notifier = Arc::new(TracingNotifier);
        let broadcaster = ChangeBroadcaster::default();
        let signal = Arc::new(broadcaster.clone());
        let options = SyncOptions::from(&config);

        let news: Arc<dyn CollectionSync> = Arc::new(ChangeListSyncEngine::<NewsArticle>::new(
            remote.clone(),
            Arc::new(SqliteEntityStore::<NewsArticle>::new(pool.clone())),
            cursor.clone(),
            reading_state.clone(),
            notifier.clone(),
            signal.clone(),
            options,
        ));
        let transfers: Arc<dyn CollectionSync> = Arc::new(ChangeListSyncEngine::<Transfer>::new(
            remote,
            Arc::new(SqliteEntityStore::<Transfer>::new(pool.clone())),
            cursor,
            reading_state.clone(),
            notifier,
            signal,
            options,
        ));

        let orchestrator = Arc::new(SyncOrchestrator::new(
            vec![news, transfers],
            Arc::new(SqliteSearchIndex::new(pool)),
            reading_state,
            config.sync.push_topics.clone(),
        ));

        info!(
            database = %config.storage.database.display(),
            remote = %config.remote.base_url,
            batch_size = options.batch_size,
            "Daemon service initialized"
        );

        Ok(Self {
            config,
            db_pool,
            orchestrator,
            broadcaster,
            shutdown,
        })
    }

    /// Performs a single orchestrated sync
    async fn run_once(&self) -> RunOutcome {
        self.orchestrator.run().await
    }

    /// Runs the scheduler until shutdown is requested
    async fn run(&self) -> Result<()> {
        let observer = tokio::spawn(log_data_changes(
            self.broadcaster.subscribe(),
            self.shutdown.clone(),
        ));

        let scheduler = SyncScheduler::from_config(
            self.orchestrator.clone(),
            &self.config.sync,
            self.shutdown.clone(),
        );
        scheduler.run().await;

        self.shutdown.cancel();
        if let Err(e) = observer.await {
            warn!(error = %e, "Data change observer ended abnormally");
        }
        self.db_pool.pool().close().await;
        Ok(())
    }
}

/// Logs every data-changed signal until shutdown
async fn log_data_changes(mut rx: broadcast::Receiver<Collection>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = rx.recv() => match received {
                Ok(collection) => debug!(collection = %collection, "Local data changed"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Data change observer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&log_filter(&config.logging.level, cli.verbose), cli.json_logs);

    info!(version = env!("CARGO_PKG_VERSION"), "Matchday daemon starting (matchdayd)");

    let shutdown_token = CancellationToken::new();
    let service = DaemonService::new(config, shutdown_token.clone()).await?;

    if cli.once {
        let outcome = service.run_once().await;
        service.db_pool.pool().close().await;
        return match outcome {
            RunOutcome::Success => {
                info!("Sync completed");
                Ok(())
            }
            RunOutcome::Retry => bail!("Sync incomplete, see log for details"),
        };
    }

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let result = service.run().await;

    match &result {
        Ok(()) => info!("Matchday daemon shut down gracefully"),
        Err(e) => error!(error = %e, "Matchday daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
