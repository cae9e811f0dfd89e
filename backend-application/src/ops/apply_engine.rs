//! Confirms a staged diff against the store.
//!
//! Every mutation of one apply call runs in a single store transaction, in a fixed
//! order: container metadata, then deletions, then insertions (or moves for a
//! transfer). A rejected record is skipped inside its own savepoint; any other store
//! failure rolls the whole transaction back and leaves the staged diff in place.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::anyhow;
use backend_domain::ports::{InventoryRepository, InventoryTransaction, StoreError};
use backend_domain::{
    ApplyRequest, ApplyResult, ContainerTransferDiff, ImportDiff, InventoryRecord, MatchedRecord,
    NewInventoryRecord, SelectionKey, StagedDiff, StagedRecordRef, StagingToken,
    TransferDirection, UserId,
};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedKind {
    Import,
    Transfer,
}

impl StagedKind {
    fn of(diff: &StagedDiff) -> Self {
        match diff {
            StagedDiff::Import(_) => StagedKind::Import,
            StagedDiff::Transfer(_) => StagedKind::Transfer,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            StagedKind::Import => "import",
            StagedKind::Transfer => "transfer",
        }
    }
}

/// Applies the selected entries of a staged diff. Never fails outright: problems are
/// reported through the returned `errors`.
pub async fn apply_staged(
    state: &AppState,
    user: &UserId,
    request: ApplyRequest,
    expected: StagedKind,
) -> ApplyResult {
    let token = StagingToken(request.token.trim().to_string());
    let staging = state.staging();

    let staged = match staging.retrieve(user, &token).await {
        Ok(Some(diff)) => diff,
        Ok(None) => {
            warn!(user = %user, token = %token, "apply requested for unknown or expired staged diff");
            state.metrics.record_apply_failure();
            return ApplyResult::failed("staged diff not found or expired");
        }
        Err(err) => {
            error!(user = %user, token = %token, "failed to read staged diff: {}", err);
            state.metrics.record_apply_failure();
            return ApplyResult::failed(format!("staging store unavailable: {}", err));
        }
    };
    if StagedKind::of(&staged) != expected {
        warn!(user = %user, token = %token, expected = expected.as_str(), "staged diff kind mismatch");
        state.metrics.record_apply_failure();
        return ApplyResult::failed(format!("token does not refer to a staged {}", expected.as_str()));
    }

    let selection = Selection::parse(&request.selected);
    let applied = match staged {
        StagedDiff::Import(diff) => apply_import_diff(state, user, diff, &selection).await,
        StagedDiff::Transfer(diff) => apply_transfer_diff(state, user, diff, &selection).await,
    };

    match applied {
        Ok(result) => {
            if let Err(err) = staging.clear(user, &token).await {
                warn!(user = %user, token = %token, "failed to clear applied staged diff: {}", err);
            }
            state.metrics.record_apply(&result);
            info!(
                user = %user,
                token = %token,
                added = result.added,
                removed = result.removed,
                moved = result.moved,
                skipped = result.skipped,
                "staged diff applied"
            );
            result
        }
        Err(err) => {
            error!(user = %user, token = %token, "apply rolled back: {}", err);
            state.metrics.record_apply_failure();
            ApplyResult::failed(format!("apply rolled back: {}", err))
        }
    }
}

async fn apply_import_diff(
    state: &AppState,
    user: &UserId,
    diff: ImportDiff,
    selection: &Selection,
) -> Result<ApplyResult, StoreError> {
    let staged_keys: HashSet<SelectionKey> = diff
        .items_to_add
        .iter()
        .map(|m| SelectionKey::Add(m.asset_id().to_string()))
        .chain(
            diff.items_to_remove
                .iter()
                .map(|r| SelectionKey::Remove(r.asset_id.clone())),
        )
        .collect();
    selection.report_unstaged(&staged_keys);

    let additions: Vec<MatchedRecord> = diff
        .items_to_add
        .into_iter()
        .filter(|m| selection.contains(&SelectionKey::Add(m.asset_id().to_string())))
        .collect();
    let removals: Vec<StagedRecordRef> = diff
        .items_to_remove
        .into_iter()
        .filter(|r| selection.contains(&SelectionKey::Remove(r.asset_id.clone())))
        .collect();

    let mut refused = Vec::new();
    let removal_ids: Vec<String> = owned_records(state, user, removals, &mut refused)
        .await?
        .into_iter()
        .map(|record| record.asset_id)
        .collect();

    let now = Utc::now();
    let inserts: Vec<NewInventoryRecord> = additions
        .iter()
        .map(|matched| new_record(user, matched, now))
        .collect();
    let containers = diff.containers;
    let owner = user.clone();

    let mut result = run_in_transaction(state.inventory_repo.clone(), move |tx, outcome| {
        for descriptor in &containers {
            tx.sync_container(&owner, descriptor)?;
        }
        if !removal_ids.is_empty() {
            outcome.removed = tx.delete_active_records(&owner, &removal_ids)?;
        }
        for record in &inserts {
            match tx.insert_record(record) {
                Ok(_) => outcome.added += 1,
                Err(StoreError::Rejected(reason)) => {
                    warn!(asset_id = %record.asset_id, "record rejected, skipped: {}", reason);
                    outcome.skipped += 1;
                    outcome
                        .errors
                        .push(format!("asset {}: {}", record.asset_id, reason));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    })
    .await?;

    result.skipped += refused.len();
    refused.append(&mut result.errors);
    result.errors = refused;
    Ok(result)
}

async fn apply_transfer_diff(
    state: &AppState,
    user: &UserId,
    diff: ContainerTransferDiff,
    selection: &Selection,
) -> Result<ApplyResult, StoreError> {
    let direction = diff.direction;
    let container_id = diff.container_id;

    let staged_keys: HashSet<SelectionKey> = diff
        .candidates
        .iter()
        .map(|c| transfer_key(direction, &c.asset_id))
        .collect();
    selection.report_unstaged(&staged_keys);

    let selected: Vec<StagedRecordRef> = diff
        .candidates
        .into_iter()
        .filter(|c| selection.contains(&transfer_key(direction, &c.asset_id)))
        .collect();

    let mut refused = Vec::new();
    let owned = owned_records(state, user, selected, &mut refused).await?;
    let mut stale = 0;
    let record_ids: Vec<i64> = owned
        .into_iter()
        .filter(|record| {
            let in_place = match direction {
                TransferDirection::Deposit => record.container_id.is_none(),
                TransferDirection::Withdraw => record.container_id == Some(container_id),
            };
            if !in_place {
                warn!(record_id = record.id, direction = direction.as_str(), "record moved since preview, skipped");
                stale += 1;
            }
            in_place
        })
        .map(|record| record.id)
        .collect();

    let target = match direction {
        TransferDirection::Deposit => Some(container_id),
        TransferDirection::Withdraw => None,
    };
    let descriptor = diff.descriptor;
    let owner = user.clone();

    let mut result = run_in_transaction(state.inventory_repo.clone(), move |tx, outcome| {
        if let Some(descriptor) = &descriptor {
            if !tx.refresh_container(container_id, descriptor)? {
                debug!(container_id, "manual container, metadata left untouched");
            }
        }
        if !record_ids.is_empty() {
            outcome.moved = tx.assign_container(&owner, &record_ids, target)?;
        }
        Ok(())
    })
    .await?;

    result.skipped += refused.len() + stale;
    refused.append(&mut result.errors);
    result.errors = refused;
    Ok(result)
}

/// Runs `work` on a blocking thread inside one store transaction.
pub(crate) async fn run_in_transaction<F>(
    repo: Arc<dyn InventoryRepository>,
    mut work: F,
) -> Result<ApplyResult, StoreError>
where
    F: FnMut(&mut dyn InventoryTransaction, &mut ApplyResult) -> Result<(), StoreError>
        + Send
        + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut outcome = ApplyResult::default();
        repo.in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
            outcome = ApplyResult::default();
            work(tx, &mut outcome)
        })?;
        Ok(outcome)
    })
    .await
    .map_err(|err| StoreError::Unavailable(anyhow!("transaction task failed: {}", err)))?
}

/// Stored records behind `refs` that still exist and belong to `user`.
/// Records owned by someone else are reported into `refused`.
pub(crate) async fn owned_records(
    state: &AppState,
    user: &UserId,
    refs: Vec<StagedRecordRef>,
    refused: &mut Vec<String>,
) -> Result<Vec<InventoryRecord>, StoreError> {
    if refs.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = refs.iter().map(|r| r.record_id).collect();
    let stored: HashMap<i64, InventoryRecord> = state
        .inventory_repo
        .find_records(&ids)
        .await?
        .into_iter()
        .map(|record| (record.id, record))
        .collect();

    let mut owned = Vec::with_capacity(refs.len());
    for staged in refs {
        match stored.get(&staged.record_id) {
            Some(record) if &record.user_id != user => {
                warn!(user = %user, record_id = staged.record_id, "record belongs to another user");
                refused.push(format!("record {} does not belong to this user", staged.record_id));
            }
            Some(record) => owned.push(record.clone()),
            None => debug!(record_id = staged.record_id, "staged record no longer exists"),
        }
    }
    Ok(owned)
}

fn new_record(user: &UserId, matched: &MatchedRecord, acquired_at: DateTime<Utc>) -> NewInventoryRecord {
    let record = &matched.record;
    NewInventoryRecord {
        user_id: user.clone(),
        asset_id: record.asset_id.clone(),
        catalog_item_id: matched.catalog_item_id,
        float_value: record.float_value,
        pattern: record.pattern,
        stattrak_kills: record.stattrak_kills,
        stickers: record.stickers.clone(),
        keychain: record.keychain.clone(),
        name_tag: record.name_tag.clone(),
        inspect_link: record.inspect_link.clone(),
        container_id: None,
        acquired_at,
        acquisition_price: None,
    }
}

pub(crate) fn transfer_key(direction: TransferDirection, asset_id: &str) -> SelectionKey {
    match direction {
        TransferDirection::Deposit => SelectionKey::Deposit(asset_id.to_string()),
        TransferDirection::Withdraw => SelectionKey::Withdraw(asset_id.to_string()),
    }
}

#[derive(Debug, Default)]
struct Selection {
    keys: HashSet<SelectionKey>,
}

impl Selection {
    fn parse(raw: &[String]) -> Self {
        let mut keys = HashSet::new();
        for value in raw {
            match SelectionKey::parse(value) {
                Some(key) => {
                    keys.insert(key);
                }
                None => warn!(key = %value, "ignoring malformed selection key"),
            }
        }
        Self { keys }
    }

    fn contains(&self, key: &SelectionKey) -> bool {
        self.keys.contains(key)
    }

    /// Selected keys with no staged entry are logged and otherwise ignored.
    fn report_unstaged(&self, staged: &HashSet<SelectionKey>) {
        for key in self.keys.iter().filter(|key| !staged.contains(*key)) {
            warn!(key = %key, "selected key is not part of the staged diff, skipped");
        }
    }
}
