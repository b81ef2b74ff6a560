pub mod scheduler;
pub mod snapshot;
pub mod views;

pub use scheduler::{CycleOutcome, CycleRunner, RefreshScheduler};
pub use snapshot::{DashboardState, SnapshotStore};
pub use views::{CoinDetail, CoinRow, DashboardView, SortConfig, SortDirection, SortKey};
