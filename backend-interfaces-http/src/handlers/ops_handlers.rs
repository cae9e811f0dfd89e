use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::AppState;

use crate::middleware::authorize;

#[derive(Serialize)]
struct ReadyStatus {
    database: &'static str,
    price_store: &'static str,
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Ready only when the inventory store answers; the price store is reported but optional.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);

    let database = probe("database", timeout_duration, state.health.check_database()).await;
    let price_store = probe("price store", timeout_duration, state.health.check_price_store()).await;

    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadyStatus { database, price_store }))
}

async fn probe(
    name: &str,
    limit: Duration,
    check: impl std::future::Future<Output = anyhow::Result<bool>>,
) -> &'static str {
    match timeout(limit, check).await {
        Ok(Ok(true)) => "ok",
        Ok(Ok(false)) => "error",
        Ok(Err(err)) => {
            error!("{} ready check failed: {}", name, err);
            "error"
        }
        Err(_) => {
            error!("{} ready check timeout after {}s", name, limit.as_secs());
            "timeout"
        }
    }
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}
