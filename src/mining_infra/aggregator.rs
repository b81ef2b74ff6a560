use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use futures::future::join_all;
use tokio::task::AbortHandle;
use tracing::{error, info, warn, Instrument};
use crate::config::coins::CoinRegistry;
use crate::error::{Error, Result};
use crate::mining_infra::adapters::{build_adapters, StatsAdapter};
use crate::mining_infra::fetch::HttpFetcher;
use crate::observability::metrics::{
    AGGREGATION_CYCLES, RECORDS_PUBLISHED, SOURCE_FAILURES, SOURCE_FETCH_LATENCY,
};
use crate::observability::tracing::{trace_aggregation_cycle, trace_source_fetch};
use crate::types::stat::MiningStat;

/// Aborts the per-source tasks when a cycle is dropped before they settle.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Fans out to every registered adapter and keeps whatever succeeded.
///
/// Holds no per-cycle state; every call starts from nothing.
pub struct MiningStatsAggregator {
    adapters: Vec<Arc<dyn StatsAdapter>>,
    cycles: AtomicU64,
}

impl MiningStatsAggregator {
    pub fn new(adapters: Vec<Arc<dyn StatsAdapter>>) -> Self {
        MiningStatsAggregator {
            adapters,
            cycles: AtomicU64::new(0),
        }
    }

    pub fn from_registry(registry: &CoinRegistry, fetcher: HttpFetcher) -> Self {
        Self::new(build_adapters(registry, fetcher))
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.source_id()).collect()
    }

    /// Records from the adapters that succeeded, in registration order.
    ///
    /// Individual adapter failures are logged and dropped; an empty vector
    /// means no source produced data. `Err` is reserved for the fan-out
    /// itself being torn down.
    pub async fn fetch_all_mining_stats(&self) -> Result<Vec<MiningStat>> {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let span = trace_aggregation_cycle(cycle);

        async move {
            let handles: Vec<_> = self.adapters
                .iter()
                .map(|adapter| {
                    let adapter = Arc::clone(adapter);
                    let span = trace_source_fetch(adapter.source_id());
                    tokio::spawn(
                        async move {
                            let started = Instant::now();
                            let result = adapter.fetch_stats().await;
                            SOURCE_FETCH_LATENCY
                                .with_label_values(&[adapter.source_id()])
                                .observe(started.elapsed().as_secs_f64());
                            result
                        }
                        .instrument(span),
                    )
                })
                .collect();
            let _abort = AbortOnDrop(handles.iter().map(|h| h.abort_handle()).collect());

            let results = join_all(handles).await;
            let mut stats = Vec::with_capacity(results.len());

            for (index, (adapter, result)) in self.adapters.iter().zip(results).enumerate() {
                let source = adapter.source_id();
                match result {
                    Ok(Ok(stat)) => stats.push(stat),
                    Ok(Err(e)) => {
                        SOURCE_FAILURES.with_label_values(&[source]).inc();
                        let kind = if e.is_source_failure() { "source" } else { "internal" };
                        warn!(
                            source_index = index,
                            source = %source,
                            kind = %kind,
                            status = ?e.status_code(),
                            error = %e,
                            "Failed to fetch mining stats"
                        );
                    }
                    Err(join_error) if join_error.is_panic() => {
                        SOURCE_FAILURES.with_label_values(&[source]).inc();
                        warn!(
                            source_index = index,
                            source = %source,
                            "Adapter panicked while fetching mining stats"
                        );
                    }
                    Err(join_error) => {
                        error!(error = %join_error, "Aggregation fan-out cancelled");
                        return Err(Error::AggregationFailed(join_error.to_string()));
                    }
                }
            }

            AGGREGATION_CYCLES.inc();
            RECORDS_PUBLISHED.set(stats.len() as i64);
            info!(
                succeeded = stats.len(),
                failed = self.adapters.len() - stats.len(),
                "Aggregation cycle complete"
            );

            Ok(stats)
        }
        .instrument(span)
        .await
    }
}
