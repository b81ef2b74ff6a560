use std::sync::{Arc, RwLock};
use std::time::Duration;
use chrono::{DateTime, Utc};
use crate::types::stat::MiningStat;

/// What the presentation layer last learned from the aggregator.
#[derive(Clone, Debug, PartialEq)]
pub enum DashboardState {
    /// No cycle has finished yet.
    Loading,
    Ready {
        stats: Vec<MiningStat>,
        refreshed_at: DateTime<Utc>,
    },
    /// The last cycle could not run. Earlier data is dropped with it.
    Failed {
        message: String,
        failed_at: DateTime<Utc>,
    },
}

/// In-memory home of the current [`DashboardState`], shared between the
/// refresh loop and request handlers.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    state: Arc<RwLock<DashboardState>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DashboardState::Loading)),
        }
    }

    pub fn publish(&self, stats: Vec<MiningStat>, refreshed_at: DateTime<Utc>) {
        self.set(DashboardState::Ready { stats, refreshed_at });
    }

    pub fn fail(&self, message: impl Into<String>, failed_at: DateTime<Utc>) {
        self.set(DashboardState::Failed {
            message: message.into(),
            failed_at,
        });
    }

    pub fn get(&self) -> DashboardState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// When the last successful cycle finished, if any.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        match self.get() {
            DashboardState::Ready { refreshed_at, .. } => Some(refreshed_at),
            _ => None,
        }
    }

    /// True when there is no successful cycle newer than `threshold`.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.is_stale_at(threshold, Utc::now())
    }

    fn is_stale_at(&self, threshold: Duration, now: DateTime<Utc>) -> bool {
        match self.refreshed_at() {
            Some(refreshed_at) => match (now - refreshed_at).to_std() {
                Ok(age) => age > threshold,
                // refreshed_at is in the future; clock moved backwards
                Err(_) => false,
            },
            None => true,
        }
    }

    fn set(&self, state: DashboardState) {
        match self.state.write() {
            Ok(mut guard) => *guard = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
