use std::sync::Arc;
use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use minestats::api::rest::{create_router, ApiState};
use minestats::config::{AppConfig, CoinRegistry};
use minestats::dashboard::{CycleRunner, RefreshScheduler, SnapshotStore};
use minestats::mining_infra::{HttpFetcher, MiningStatsAggregator};
use minestats::observability::metrics::register_metrics;
use minestats::observability::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("MINESTATS_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("failed to load configuration")?;

    init_tracing(&config.logging);
    register_metrics();

    let registry = Arc::new(CoinRegistry::new(config.coins.clone())?);
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let aggregator = Arc::new(MiningStatsAggregator::from_registry(&registry, fetcher));

    info!(
        env = %env,
        sources = ?aggregator.source_ids(),
        timeout_ms = config.fetch.timeout_ms,
        refresh_interval_secs = config.scheduler.refresh_interval_secs,
        "Starting mining stats service"
    );

    let runner = CycleRunner::new(aggregator, SnapshotStore::new());
    let scheduler = RefreshScheduler::new(runner.clone(), config.scheduler.refresh_interval())?;
    scheduler.start()?;

    let state = Arc::new(ApiState {
        runner,
        registry,
        stale_after: config.scheduler.stale_after(),
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_address))?;
    info!(address = %config.server.listen_address, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, shutting down"),
        _ = terminate => warn!("Received terminate signal, shutting down"),
    }
}
