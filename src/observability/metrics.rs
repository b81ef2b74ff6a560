use std::sync::Once;
use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Cycle metrics
    pub static ref AGGREGATION_CYCLES: IntCounter = IntCounter::new(
        "mining_aggregation_cycles_total",
        "Total number of completed aggregation cycles"
    ).unwrap();

    pub static ref CYCLES_SKIPPED: IntCounter = IntCounter::new(
        "mining_cycles_skipped_total",
        "Refresh requests skipped because a cycle was already in flight"
    ).unwrap();

    pub static ref RECORDS_PUBLISHED: IntGauge = IntGauge::new(
        "mining_records_published",
        "Records produced by the most recent aggregation cycle"
    ).unwrap();

    // Source metrics
    pub static ref SOURCE_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("mining_source_failures_total", "Failed adapter fetches per source"),
        &["source"]
    ).unwrap();

    pub static ref SOURCE_FETCH_LATENCY: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "mining_source_fetch_seconds",
            "Adapter fetch latency per source"
        ).buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["source"]
    ).unwrap();
}

static REGISTER: Once = Once::new();

pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY.register(Box::new(AGGREGATION_CYCLES.clone())).unwrap();
        REGISTRY.register(Box::new(CYCLES_SKIPPED.clone())).unwrap();
        REGISTRY.register(Box::new(RECORDS_PUBLISHED.clone())).unwrap();
        REGISTRY.register(Box::new(SOURCE_FAILURES.clone())).unwrap();
        REGISTRY.register(Box::new(SOURCE_FETCH_LATENCY.clone())).unwrap();
    });
}

/// Text exposition of everything in [`REGISTRY`].
pub fn gather_text() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
