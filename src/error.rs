use thiserror::Error;

/// Crate-wide error. Adapter failures (`SourceUnavailable`, `UpstreamStatus`,
/// `MalformedPayload`, `InvalidField`) are the tagged mining API errors that
/// the aggregator logs and filters; they never reach its caller.
#[derive(Error, Debug)]
pub enum Error {
    // Fetch Errors
    #[error("Source unavailable: {url}: {reason}")]
    SourceUnavailable {
        url: String,
        reason: String,
    },

    #[error("HTTP error! status: {status} (source: {source_id})")]
    UpstreamStatus {
        source_id: String,
        status: u16,
    },

    #[error("Malformed payload from {source_id}: {reason}")]
    MalformedPayload {
        source_id: String,
        reason: String,
    },

    #[error("Invalid {field} from {source_id}: {value}")]
    InvalidField {
        source_id: String,
        field: &'static str,
        value: f64,
    },

    // Aggregation Errors
    #[error("Failed to fetch mining statistics: {0}")]
    AggregationFailed(String),

    #[error("Scheduler already running")]
    SchedulerAlreadyRunning,

    // Analytics Errors
    #[error("Network hashrate must be positive, got {0}")]
    NonPositiveNetworkHashrate(f64),

    #[error("Invalid hashrate: {0}")]
    InvalidHashrate(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown coin: {0}")]
    UnknownCoin(String),

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// HTTP status reported by the upstream, when the failure carried one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Failure attributable to what a single source sent or failed to send.
    /// Anything else an adapter returns points at local configuration or a
    /// bug, and is logged as `kind=internal` by the aggregator.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable { .. }
                | Error::UpstreamStatus { .. }
                | Error::MalformedPayload { .. }
                | Error::InvalidField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
