//! Sync scheduler - periodic runs, retry backoff and "sync now"
//!
//! The [`SyncScheduler`] owns the run loop of the daemon. After every run it
//! waits for whichever comes first:
//!
//! - the next delay elapsing (the regular interval after a success, an
//!   exponential backoff after a [`RunOutcome::Retry`])
//! - a "sync now" request through the shared [`Notify`]
//! - cancellation of the shutdown token
//!
//! ```text
//! run ──→ Success ──→ sleep(interval) ──┐
//!   ↑ ──→ Retry   ──→ sleep(backoff) ───┤
//!   └──────────── sync now / elapsed ───┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use matchday_core::config::SyncConfig;

use crate::orchestrator::{RunOutcome, SyncRunner};

/// Runs a [`SyncRunner`] on a schedule until shut down
pub struct SyncScheduler {
    runner: Arc<dyn SyncRunner>,
    interval: Duration,
    retry_base: Duration,
    retry_max: Duration,
    sync_now: Arc<Notify>,
    shutdown: CancellationToken,
}

impl SyncScheduler {
    /// Creates a new `SyncScheduler`
    ///
    /// # Arguments
    /// * `runner` - What to run on every tick
    /// * `interval` - Delay between runs after a success
    /// * `retry_base` - First retry delay; doubled on every consecutive failure
    /// * `retry_max` - Upper bound of the retry delay
    /// * `shutdown` - Token that stops the loop when cancelled
    pub fn new(
        runner: Arc<dyn SyncRunner>,
        interval: Duration,
        retry_base: Duration,
        retry_max: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            runner,
            interval,
            retry_base,
            retry_max: retry_max.max(retry_base),
            sync_now: Arc::new(Notify::new()),
            shutdown,
        }
    }

    /// Creates a scheduler from the `sync` section of the configuration
    pub fn from_config(
        runner: Arc<dyn SyncRunner>,
        config: &SyncConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self::new(
            runner,
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.retry_base_secs),
            Duration::from_secs(config.retry_max_secs),
            shutdown,
        )
    }

    /// Handle used to request an immediate run
    ///
    /// A request made while a run is in progress triggers one more run
    /// right after it finishes.
    pub fn sync_now_handle(&self) -> Arc<Notify> {
        self.sync_now.clone()
    }

    /// Requests an immediate run, skipping the current wait
    pub fn request_sync(&self) {
        info!("Immediate sync requested");
        self.sync_now.notify_one();
    }

    /// Delay before the next run given the number of consecutive failures
    ///
    /// Zero failures yields the regular interval. Otherwise the delay is
    /// `retry_base * 2^(failures - 1)`, capped at `retry_max`.
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return self.interval;
        }
        let exponent = (consecutive_failures - 1).min(31);
        self.retry_base
            .checked_mul(1u32 << exponent)
            .map_or(self.retry_max, |delay| delay.min(self.retry_max))
    }

    /// Performs a single run outside the loop
    pub async fn run_once(&self) -> RunOutcome {
        self.runner.run().await
    }

    /// Main loop; returns once the shutdown token is cancelled
    ///
    /// A run in flight when shutdown is requested is dropped at its next
    /// await point. Work it already committed stays committed.
    pub async fn run(&self) {
        info!(
            interval_secs = self.interval.as_secs(),
            retry_base_secs = self.retry_base.as_secs(),
            retry_max_secs = self.retry_max.as_secs(),
            "Sync scheduler starting"
        );

        let mut consecutive_failures: u32 = 0;

        loop {
            let outcome = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                outcome = self.runner.run() => outcome,
            };

            match outcome {
                RunOutcome::Success => consecutive_failures = 0,
                RunOutcome::Retry => consecutive_failures = consecutive_failures.saturating_add(1),
            }

            let delay = self.next_delay(consecutive_failures);
            if consecutive_failures > 0 {
                warn!(
                    consecutive_failures,
                    retry_in_secs = delay.as_secs(),
                    "Sync run failed, scheduling retry"
                );
            } else {
                debug!(next_in_secs = delay.as_secs(), "Sync run succeeded");
            }

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = self.sync_now.notified() => {
                    debug!("Woken by sync now request");
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("Sync scheduler stopped");
    }
}
