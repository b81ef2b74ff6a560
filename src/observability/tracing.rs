use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }
}

pub fn trace_aggregation_cycle(cycle: u64) -> Span {
    tracing::info_span!(
        "aggregation_cycle",
        cycle = cycle,
    )
}

pub fn trace_source_fetch(source_id: &str) -> Span {
    tracing::debug_span!(
        "source_fetch",
        source = %source_id,
    )
}
