use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use backend_application::commands::price_commands;
use backend_application::queries::price_queries;
use backend_application::AppState;
use backend_domain::{PriceSamplesPayload, PriceTrend, PriceTrendQuery};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(Serialize)]
pub struct IngestSummary {
    pub inserted: usize,
}

pub async fn price_trend(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PriceTrendQuery>,
) -> Result<Json<PriceTrend>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let trend = price_queries::price_trend(&state, query).await?;
    Ok(Json(trend))
}

pub async fn ingest_price_samples(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PriceSamplesPayload>,
) -> Result<Json<IngestSummary>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let inserted = price_commands::ingest_price_samples(&state, payload).await?;
    Ok(Json(IngestSummary { inserted }))
}
