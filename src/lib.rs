pub mod error;
pub mod types;
pub mod config;
pub mod mining_infra;
pub mod analytics;
pub mod dashboard;
pub mod observability;
pub mod api;

// Seconds in a day, the basis of every per-day figure
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// Upstream request budget when nothing is configured
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
