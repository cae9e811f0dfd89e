use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::error;

use backend_application::commands::import_commands;
use backend_application::AppState;
use backend_domain::{ApplyRequest, ApplyResult, ImportPreview, ImportPreviewRequest};

use crate::error::HttpError;
use crate::middleware::{authenticate, parse_json_body};

pub async fn preview_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<ImportPreview>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let request: ImportPreviewRequest =
        parse_json_body(&headers, &body, state.config.max_body_bytes).map_err(|err| {
            error!("failed to parse import preview body: {}", err);
            HttpError::BadRequest(err.to_string())
        })?;
    let preview = import_commands::preview_import(&state, &user, request).await?;
    Ok(Json(preview))
}

pub async fn apply_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<ApplyResult>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    Ok(Json(import_commands::apply_import(&state, &user, request).await))
}
