use axum::{
    Router,
    routing::{get, post},
    extract::{Path, Query, State, Json},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use crate::config::coins::CoinRegistry;
use crate::dashboard::scheduler::{CycleOutcome, CycleRunner};
use crate::dashboard::snapshot::DashboardState;
use crate::dashboard::views::{CoinDetail, DashboardView, SortConfig, SortDirection, SortKey};
use crate::error::Error;
use crate::observability::metrics::gather_text;
use crate::types::hashrate::Hashrate;
use crate::types::ids::CoinId;

pub struct ApiState {
    pub runner: CycleRunner,
    pub registry: Arc<CoinRegistry>,
    pub stale_after: Duration,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/mining", get(mining_table))
        .route("/api/mining/stats", get(mining_stats))
        .route("/api/mining/refresh", post(refresh))
        .route("/api/coins/:coin_id", get(coin_detail))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn health_check(State(state): State<Arc<ApiState>>) -> Response {
    let store = state.runner.store();
    let stale = store.is_stale(state.stale_after);
    let status = if stale {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = json!({
        "healthy": !stale,
        "stale": stale,
        "lastRefresh": store.refreshed_at(),
    });
    (status, Json(body)).into_response()
}

#[derive(Deserialize)]
struct TableQuery {
    sort: Option<SortKey>,
    direction: Option<SortDirection>,
}

async fn mining_table(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TableQuery>,
) -> Json<DashboardView> {
    let sort = SortConfig {
        key: query.sort.unwrap_or_default(),
        direction: query.direction.unwrap_or_default(),
    };
    Json(DashboardView::from_state(&state.runner.store().get(), sort))
}

async fn mining_stats(State(state): State<Arc<ApiState>>) -> Response {
    match state.runner.store().get() {
        DashboardState::Ready { stats, .. } => Json(stats).into_response(),
        DashboardState::Loading => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Mining statistics are still loading")
        }
        DashboardState::Failed { .. } => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch mining statistics")
        }
    }
}

#[derive(Deserialize)]
struct DetailQuery {
    hashrate: Option<String>,
}

async fn coin_detail(
    State(state): State<Arc<ApiState>>,
    Path(coin_id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let coin_id = CoinId::new(coin_id);
    let coin = match state.registry.get(&coin_id) {
        Ok(coin) => coin,
        Err(e) => return error_response(StatusCode::NOT_FOUND, e.to_string()),
    };

    let miner_hashrate = match query.hashrate.as_deref().map(str::parse::<Hashrate>).transpose() {
        Ok(hashrate) => hashrate,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let stats = match state.runner.store().get() {
        DashboardState::Ready { stats, .. } => stats,
        _ => return error_response(StatusCode::SERVICE_UNAVAILABLE, "No data available"),
    };
    let Some(stat) = stats.iter().find(|s| s.id == coin_id) else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("No data available for {}", coin_id),
        );
    };

    match CoinDetail::build(coin, stat, miner_hashrate) {
        Ok(detail) => Json(detail).into_response(),
        Err(e @ Error::NonPositiveNetworkHashrate(_)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn refresh(State(state): State<Arc<ApiState>>) -> Response {
    match state.runner.run_cycle().await {
        CycleOutcome::Completed(records) => {
            info!(records, "Manual refresh completed");
            Json(json!({ "outcome": "completed", "records": records })).into_response()
        }
        CycleOutcome::Skipped => {
            (StatusCode::ACCEPTED, Json(json!({ "outcome": "skipped" }))).into_response()
        }
        CycleOutcome::Failed(message) => {
            warn!(error = %message, "Manual refresh failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "outcome": "failed", "error": message })),
            )
                .into_response()
        }
    }
}

async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_text(),
    )
}
