//! Set differences between stored state and a freshly parsed snapshot.
//!
//! Stored records are identified by the marketplace asset id, which the marketplace
//! reassigns when an item moves in or out of a storage unit. Withdraw matching
//! therefore falls back to comparing hash name, float and pattern.

use std::collections::HashSet;

use crate::entities::{InventoryRecord, MatchedRecord, NormalizedRecord};

/// Two floats closer than this are the same wear value.
pub const FLOAT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportDiffSets {
    pub to_add: Vec<MatchedRecord>,
    pub to_remove: Vec<InventoryRecord>,
}

/// Snapshot-present, unknown records are added. Active records missing from the
/// snapshot are removed. Records inside a container never take part.
pub fn compute_import_diff(active: &[InventoryRecord], incoming: &[MatchedRecord]) -> ImportDiffSets {
    let active: Vec<&InventoryRecord> = active.iter().filter(|r| r.is_active()).collect();
    let stored_ids: HashSet<&str> = active.iter().map(|r| r.asset_id.as_str()).collect();
    let incoming_ids: HashSet<&str> = incoming.iter().map(MatchedRecord::asset_id).collect();

    let mut seen = HashSet::new();
    let to_add = incoming
        .iter()
        .filter(|m| !stored_ids.contains(m.asset_id()))
        .filter(|m| seen.insert(m.asset_id().to_string()))
        .cloned()
        .collect();
    let to_remove = active
        .into_iter()
        .filter(|r| !incoming_ids.contains(r.asset_id.as_str()))
        .cloned()
        .collect();

    ImportDiffSets { to_add, to_remove }
}

/// Active records that vanished from the snapshot and are presumed deposited.
pub fn compute_deposit_candidates(
    active: &[InventoryRecord],
    snapshot: &[NormalizedRecord],
) -> Vec<InventoryRecord> {
    let present: HashSet<&str> = snapshot.iter().map(|r| r.asset_id.as_str()).collect();
    active
        .iter()
        .filter(|r| r.is_active() && !present.contains(r.asset_id.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawMatch {
    /// Stored container record, carrying the asset id it has in the snapshot.
    pub record: InventoryRecord,
    /// Set when the asset id was found by property matching and differs from the stored one.
    pub healed_from: Option<String>,
}

/// Matches records that appeared in the snapshot against the container's contents.
///
/// Exact asset id matches are claimed first across all appeared records, then the
/// remaining ones are matched on hash name, float and pattern. Each stored record
/// is claimed at most once.
pub fn compute_withdraw_matches(
    active: &[InventoryRecord],
    contents: &[InventoryRecord],
    snapshot: &[NormalizedRecord],
) -> Vec<WithdrawMatch> {
    let known: HashSet<&str> = active
        .iter()
        .filter(|r| r.is_active())
        .map(|r| r.asset_id.as_str())
        .collect();
    let appeared: Vec<&NormalizedRecord> = snapshot
        .iter()
        .filter(|r| !known.contains(r.asset_id.as_str()))
        .collect();

    let mut claimed = vec![false; contents.len()];
    let mut resolved: Vec<Option<usize>> = vec![None; appeared.len()];

    for (slot, record) in appeared.iter().enumerate() {
        if let Some(index) = contents
            .iter()
            .enumerate()
            .position(|(i, stored)| !claimed[i] && stored.asset_id == record.asset_id)
        {
            claimed[index] = true;
            resolved[slot] = Some(index);
        }
    }

    for (slot, record) in appeared.iter().enumerate() {
        if resolved[slot].is_some() {
            continue;
        }
        if let Some(index) = contents
            .iter()
            .enumerate()
            .position(|(i, stored)| !claimed[i] && properties_match(stored, record))
        {
            claimed[index] = true;
            resolved[slot] = Some(index);
        }
    }

    appeared
        .iter()
        .zip(resolved)
        .filter_map(|(record, index)| {
            let stored = &contents[index?];
            let mut healed = stored.clone();
            let healed_from = if stored.asset_id != record.asset_id {
                healed.asset_id = record.asset_id.clone();
                Some(stored.asset_id.clone())
            } else {
                None
            };
            Some(WithdrawMatch {
                record: healed,
                healed_from,
            })
        })
        .collect()
}

pub fn properties_match(stored: &InventoryRecord, candidate: &NormalizedRecord) -> bool {
    stored.hash_name == candidate.hash_name
        && floats_match(stored.float_value, candidate.float_value)
        && stored.pattern == candidate.pattern
}

/// Both absent, or both present and within [`FLOAT_EPSILON`].
pub fn floats_match(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => (x - y).abs() < FLOAT_EPSILON,
        _ => false,
    }
}
