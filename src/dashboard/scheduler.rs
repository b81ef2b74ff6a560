use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};
use crate::dashboard::snapshot::SnapshotStore;
use crate::error::{Error, Result};
use crate::mining_infra::aggregator::MiningStatsAggregator;
use crate::observability::metrics::CYCLES_SKIPPED;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Number of records published.
    Completed(usize),
    /// Another cycle was still in flight.
    Skipped,
    Failed(String),
}

/// Runs one aggregation cycle at a time and publishes its result.
///
/// Scheduled ticks and manual refreshes share the same runner, so at most one
/// cycle's requests are outstanding at once.
#[derive(Clone)]
pub struct CycleRunner {
    aggregator: Arc<MiningStatsAggregator>,
    store: SnapshotStore,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag even if the cycle future is dropped mid-way.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CycleRunner {
    pub fn new(aggregator: Arc<MiningStatsAggregator>, store: SnapshotStore) -> Self {
        CycleRunner {
            aggregator,
            store,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            CYCLES_SKIPPED.inc();
            debug!("Previous aggregation cycle still in flight, skipping");
            return CycleOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        match self.aggregator.fetch_all_mining_stats().await {
            Ok(stats) => {
                let published = stats.len();
                self.store.publish(stats, Utc::now());
                CycleOutcome::Completed(published)
            }
            Err(e) => {
                error!(error = %e, "Aggregation cycle failed");
                let message = e.to_string();
                self.store.fail(message.clone(), Utc::now());
                CycleOutcome::Failed(message)
            }
        }
    }
}

struct RunningLoop {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

/// Re-runs a [`CycleRunner`] on a fixed interval until stopped.
///
/// The first cycle starts immediately. Ticks that fall due while a cycle is
/// still running are dropped rather than queued.
pub struct RefreshScheduler {
    runner: CycleRunner,
    period: Duration,
    running: Mutex<Option<RunningLoop>>,
}

impl RefreshScheduler {
    pub fn new(runner: CycleRunner, period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::ConfigError("refresh interval must be positive".to_string()));
        }

        Ok(RefreshScheduler {
            runner,
            period,
            running: Mutex::new(None),
        })
    }

    pub fn runner(&self) -> &CycleRunner {
        &self.runner
    }

    pub fn start(&self) -> Result<()> {
        let mut running = self.lock();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return Err(Error::SchedulerAlreadyRunning);
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let runner = self.runner.clone();
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        let outcome = runner.run_cycle().await;
                        debug!(?outcome, "Refresh tick handled");
                    }
                }
            }
        });

        info!(interval_secs = period.as_secs_f64(), "Refresh scheduler started");
        *running = Some(RunningLoop { handle, shutdown });
        Ok(())
    }

    /// Stops after the cycle in progress, if any, has published.
    pub async fn stop(&self) {
        let Some(running) = self.lock().take() else {
            return;
        };

        let _ = running.shutdown.send(true);
        if let Err(e) = running.handle.await {
            error!(error = %e, "Refresh loop terminated abnormally");
        }
        info!("Refresh scheduler stopped");
    }

    /// Stops immediately, abandoning the cycle in progress.
    pub fn cancel(&self) {
        if let Some(running) = self.lock().take() {
            running.handle.abort();
            info!("Refresh scheduler cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<RunningLoop>> {
        match self.running.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
