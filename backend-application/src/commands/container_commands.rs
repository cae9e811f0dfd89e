use backend_domain::{
    compute_deposit_candidates, compute_withdraw_matches, current_millis, extract_containers,
    ApplyRequest, ApplyResult, Container, ContainerNameRequest, ContainerTransferDiff, DiffEntry,
    InventoryRecord, MoveRecordsRequest, SnapshotParser, StagedDiff,
    StagedRecordRef, TransferDirection, TransferPreview, TransferPreviewRequest, UserId,
};
use tracing::{error, info, warn};

use crate::commands::import_commands::parse_snapshot;
use crate::enrichment::enrich_entries;
use crate::ops::apply_engine::{
    apply_staged, owned_records, run_in_transaction, transfer_key, StagedKind,
};
use crate::{AppError, AppState};

const MAX_CONTAINER_NAME_CHARS: usize = 64;

pub async fn preview_deposit(
    state: &AppState,
    user: &UserId,
    container_id: i64,
    request: TransferPreviewRequest,
) -> Result<TransferPreview, AppError> {
    preview_transfer(state, user, container_id, request, TransferDirection::Deposit).await
}

pub async fn preview_withdraw(
    state: &AppState,
    user: &UserId,
    container_id: i64,
    request: TransferPreviewRequest,
) -> Result<TransferPreview, AppError> {
    preview_transfer(state, user, container_id, request, TransferDirection::Withdraw).await
}

pub async fn apply_transfer(state: &AppState, user: &UserId, request: ApplyRequest) -> ApplyResult {
    apply_staged(state, user, request, StagedKind::Transfer).await
}

async fn preview_transfer(
    state: &AppState,
    user: &UserId,
    container_id: i64,
    request: TransferPreviewRequest,
    direction: TransferDirection,
) -> Result<TransferPreview, AppError> {
    let container = owned_container(state, user, container_id).await?;
    let Some(external_id) = container.external_id.clone() else {
        return Err(AppError::BadRequest(format!(
            "container {} is managed by hand and is not synced from snapshots",
            container_id
        )));
    };

    let snapshot = parse_snapshot(state, "inventory", &request.snapshot)?;
    let records = SnapshotParser::new()
        .with_owner(user.as_str())
        .parse(&snapshot);
    let descriptor = extract_containers(&[&snapshot])
        .into_iter()
        .find(|descriptor| descriptor.external_id == external_id);

    let active = state
        .inventory_repo
        .find_active_inventory(user)
        .await
        .map_err(internal("failed to load active inventory"))?;

    let (candidates, healed) = match direction {
        TransferDirection::Deposit => (compute_deposit_candidates(&active, &records), 0),
        TransferDirection::Withdraw => {
            let contents = state
                .inventory_repo
                .find_container_contents(container_id)
                .await
                .map_err(internal("failed to load container contents"))?;
            let matches = compute_withdraw_matches(&active, &contents, &records);
            let mut healed = 0;
            let mut candidates = Vec::with_capacity(matches.len());
            for found in matches {
                if let Some(previous) = &found.healed_from {
                    let updated = state
                        .inventory_repo
                        .update_asset_id(found.record.id, &found.record.asset_id)
                        .await
                        .map_err(internal("failed to persist healed asset id"))?;
                    if !updated {
                        warn!(
                            record_id = found.record.id,
                            asset_id = %found.record.asset_id,
                            "heal skipped: asset id already held by another record"
                        );
                        continue;
                    }
                    info!(
                        record_id = found.record.id,
                        from = %previous,
                        to = %found.record.asset_id,
                        "asset id healed by property match"
                    );
                    healed += 1;
                }
                candidates.push(found.record);
            }
            (candidates, healed)
        }
    };

    let mut entries: Vec<DiffEntry> = candidates
        .iter()
        .map(|record| DiffEntry::for_stored(transfer_key(direction, &record.asset_id), record))
        .collect();
    enrich_entries(state, &mut entries).await;

    let staged = StagedDiff::Transfer(ContainerTransferDiff {
        user_id: user.clone(),
        container_id,
        direction,
        candidates: candidates.iter().map(StagedRecordRef::from).collect(),
        descriptor: descriptor.clone(),
        created_at_ms: current_millis(),
    });
    let token = state.staging().store(&staged).await.map_err(AppError::Internal)?;

    state.metrics.record_preview();
    info!(
        user = %user,
        token = %token,
        container_id,
        direction = direction.as_str(),
        candidates = entries.len(),
        healed,
        "transfer preview staged"
    );

    Ok(TransferPreview {
        token,
        container_id,
        direction,
        entries,
        healed,
        descriptor,
    })
}

pub async fn create_container(
    state: &AppState,
    user: &UserId,
    request: ContainerNameRequest,
) -> Result<Container, AppError> {
    let name = normalize_container_name(&request.name)?;
    let container = state
        .inventory_repo
        .create_manual_container(user, &name)
        .await
        .map_err(internal("failed to create container"))?;
    info!(user = %user, container_id = container.id, "manual container created");
    Ok(container)
}

/// Only manual containers can be renamed; marketplace ones take their name from snapshots.
pub async fn rename_container(
    state: &AppState,
    user: &UserId,
    container_id: i64,
    request: ContainerNameRequest,
) -> Result<Container, AppError> {
    let mut container = owned_container(state, user, container_id).await?;
    if !container.is_manual() {
        return Err(AppError::BadRequest(format!(
            "container {} takes its name from the marketplace",
            container_id
        )));
    }
    let name = normalize_container_name(&request.name)?;
    state
        .inventory_repo
        .rename_container(container_id, &name)
        .await
        .map_err(internal("failed to rename container"))?;
    container.name = name;
    Ok(container)
}

/// Deletes the container; whatever it held returns to the active inventory.
pub async fn delete_container(
    state: &AppState,
    user: &UserId,
    container_id: i64,
) -> Result<usize, AppError> {
    owned_container(state, user, container_id).await?;
    let released = state
        .inventory_repo
        .delete_container(container_id)
        .await
        .map_err(internal("failed to delete container"))?;
    info!(user = %user, container_id, released, "container deleted");
    Ok(released)
}

/// Moves records into a container, or back to the active inventory when no container is given.
pub async fn move_records(
    state: &AppState,
    user: &UserId,
    request: MoveRecordsRequest,
) -> Result<ApplyResult, AppError> {
    if request.record_ids.is_empty() {
        return Err(AppError::BadRequest("record_ids must not be empty".to_string()));
    }
    if let Some(container_id) = request.container_id {
        owned_container(state, user, container_id).await?;
    }

    let refs: Vec<StagedRecordRef> = state
        .inventory_repo
        .find_records(&request.record_ids)
        .await
        .map_err(internal("failed to load records"))?
        .iter()
        .map(StagedRecordRef::from)
        .collect();
    let missing = request.record_ids.len().saturating_sub(refs.len());

    let mut refused = Vec::new();
    let record_ids: Vec<i64> = owned_records(state, user, refs, &mut refused)
        .await
        .map_err(|err| AppError::Internal(err.into()))?
        .iter()
        .map(|record: &InventoryRecord| record.id)
        .collect();

    let owner = user.clone();
    let target = request.container_id;
    let mut result = run_in_transaction(state.inventory_repo.clone(), move |tx, outcome| {
        if !record_ids.is_empty() {
            outcome.moved = tx.assign_container(&owner, &record_ids, target)?;
        }
        Ok(())
    })
    .await
    .map_err(|err| {
        error!(user = %user, "record move rolled back: {}", err);
        AppError::Internal(err.into())
    })?;

    if missing > 0 {
        warn!(user = %user, missing, "move requested for unknown records");
        refused.push(format!("{} record(s) not found", missing));
    }
    result.skipped = refused.len();
    result.errors = refused;
    state.metrics.record_apply(&result);
    Ok(result)
}

async fn owned_container(state: &AppState, user: &UserId, container_id: i64) -> Result<Container, AppError> {
    let container = state
        .inventory_repo
        .find_container(container_id)
        .await
        .map_err(internal("failed to load container"))?;
    match container {
        Some(container) if &container.user_id == user => Ok(container),
        _ => Err(AppError::NotFound(format!("container {}", container_id))),
    }
}

fn normalize_container_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("container name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_CONTAINER_NAME_CHARS {
        return Err(AppError::BadRequest(format!(
            "container name must be at most {} characters",
            MAX_CONTAINER_NAME_CHARS
        )));
    }
    Ok(name.to_string())
}

fn internal(context: &'static str) -> impl Fn(anyhow::Error) -> AppError {
    move |err| {
        error!("{}: {}", context, err);
        AppError::Internal(err.context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_names_are_trimmed_and_bounded() {
        assert_eq!(normalize_container_name("  Knives ").expect("name"), "Knives");
        assert!(matches!(
            normalize_container_name("   "),
            Err(AppError::BadRequest(_))
        ));
        let long = "x".repeat(MAX_CONTAINER_NAME_CHARS + 1);
        assert!(normalize_container_name(&long).is_err());
    }
}
