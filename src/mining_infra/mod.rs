pub mod adapters;
pub mod aggregator;
pub mod fetch;

pub use adapters::{build_adapters, StatsAdapter};
pub use aggregator::MiningStatsAggregator;
pub use fetch::HttpFetcher;
