use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::error;

use backend_application::commands::container_commands;
use backend_application::queries::inventory_queries;
use backend_application::AppState;
use backend_domain::{
    ApplyRequest, ApplyResult, Container, ContainerNameRequest, ContainerSummary,
    InventoryRecord, MoveRecordsRequest, TransferPreview, TransferPreviewRequest,
};

use crate::error::HttpError;
use crate::middleware::{authenticate, parse_json_body};

pub async fn preview_deposit(
    State(state): State<AppState>,
    Path(container_id): Path<i64>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<TransferPreview>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let request = parse_transfer_body(&state, &headers, &body)?;
    let preview = container_commands::preview_deposit(&state, &user, container_id, request).await?;
    Ok(Json(preview))
}

pub async fn preview_withdraw(
    State(state): State<AppState>,
    Path(container_id): Path<i64>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<TransferPreview>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let request = parse_transfer_body(&state, &headers, &body)?;
    let preview = container_commands::preview_withdraw(&state, &user, container_id, request).await?;
    Ok(Json(preview))
}

pub async fn apply_transfer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<ApplyResult>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    Ok(Json(container_commands::apply_transfer(&state, &user, request).await))
}

pub async fn list_containers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ContainerSummary>>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let containers = inventory_queries::list_containers(&state, &user).await?;
    Ok(Json(containers))
}

pub async fn create_container(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ContainerNameRequest>,
) -> Result<(StatusCode, Json<Container>), HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let container = container_commands::create_container(&state, &user, request).await?;
    Ok((StatusCode::CREATED, Json(container)))
}

pub async fn rename_container(
    State(state): State<AppState>,
    Path(container_id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<ContainerNameRequest>,
) -> Result<Json<Container>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let container =
        container_commands::rename_container(&state, &user, container_id, request).await?;
    Ok(Json(container))
}

pub async fn delete_container(
    State(state): State<AppState>,
    Path(container_id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    container_commands::delete_container(&state, &user, container_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn container_contents(
    State(state): State<AppState>,
    Path(container_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Vec<InventoryRecord>>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let records = inventory_queries::container_contents(&state, &user, container_id).await?;
    Ok(Json(records))
}

pub async fn move_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MoveRecordsRequest>,
) -> Result<Json<ApplyResult>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let result = container_commands::move_records(&state, &user, request).await?;
    Ok(Json(result))
}

fn parse_transfer_body(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<TransferPreviewRequest, HttpError> {
    parse_json_body(headers, body, state.config.max_body_bytes).map_err(|err| {
        error!("failed to parse transfer preview body: {}", err);
        HttpError::BadRequest(err.to_string())
    })
}
