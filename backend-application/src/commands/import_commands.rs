use std::collections::BTreeSet;

use backend_domain::{
    compute_import_diff, current_millis, extract_containers, ApplyRequest, ApplyResult,
    CatalogMatcher, DiffEntry, ImportDiff, ImportPreview, ImportPreviewRequest, RawSnapshot,
    SelectionKey, SnapshotParser, StagedDiff, StagedRecordRef, UserId,
};
use tracing::{error, info};

use crate::enrichment::enrich_entries;
use crate::ops::apply_engine::{apply_staged, StagedKind};
use crate::{AppError, AppState};

/// Parses both exports, diffs them against the active inventory and stages the result.
pub async fn preview_import(
    state: &AppState,
    user: &UserId,
    request: ImportPreviewRequest,
) -> Result<ImportPreview, AppError> {
    // Both exports must parse before anything else happens.
    let tradeable = parse_snapshot(state, "tradeable", &request.tradeable)?;
    let trade_locked = parse_snapshot(state, "trade_locked", &request.trade_locked)?;
    let snapshots = [&tradeable, &trade_locked];

    let records = SnapshotParser::new()
        .with_owner(user.as_str())
        .parse_all(&snapshots);
    let containers = extract_containers(&snapshots);

    let hash_names: Vec<String> = records
        .iter()
        .map(|record| record.hash_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let catalog = state
        .catalog_repo
        .find_by_hash_names(&hash_names)
        .await
        .map_err(|err| {
            error!("failed to load catalog entries: {}", err);
            AppError::Internal(err)
        })?;
    let (matched, unmatched) = CatalogMatcher::new(catalog).partition(records);

    let active = state
        .inventory_repo
        .find_active_inventory(user)
        .await
        .map_err(|err| {
            error!(user = %user, "failed to load active inventory: {}", err);
            AppError::Internal(err)
        })?;
    let diff = compute_import_diff(&active, &matched);

    let mut to_add: Vec<DiffEntry> = diff.to_add.iter().map(DiffEntry::for_addition).collect();
    let mut to_remove: Vec<DiffEntry> = diff
        .to_remove
        .iter()
        .map(|record| DiffEntry::for_stored(SelectionKey::Remove(record.asset_id.clone()), record))
        .collect();
    let add_value = enrich_entries(state, &mut to_add).await;
    let remove_value = enrich_entries(state, &mut to_remove).await;

    let staged = StagedDiff::Import(ImportDiff {
        user_id: user.clone(),
        items_to_add: diff.to_add,
        items_to_remove: diff.to_remove.iter().map(StagedRecordRef::from).collect(),
        containers: containers.clone(),
        created_at_ms: current_millis(),
    });
    let token = state.staging().store(&staged).await.map_err(AppError::Internal)?;

    state.metrics.record_preview();
    info!(
        user = %user,
        token = %token,
        to_add = to_add.len(),
        to_remove = to_remove.len(),
        unmatched = unmatched.len(),
        containers = containers.len(),
        "import preview staged"
    );

    Ok(ImportPreview {
        token,
        to_add,
        to_remove,
        unmatched,
        containers,
        add_value,
        remove_value,
    })
}

pub async fn apply_import(state: &AppState, user: &UserId, request: ApplyRequest) -> ApplyResult {
    apply_staged(state, user, request, StagedKind::Import).await
}

pub(crate) fn parse_snapshot(state: &AppState, label: &str, raw: &str) -> Result<RawSnapshot, AppError> {
    RawSnapshot::from_json(raw).map_err(|err| {
        state.metrics.record_snapshot_error();
        AppError::BadRequest(format!("invalid {} snapshot: {}", label, err))
    })
}
