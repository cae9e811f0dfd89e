// Diff entities
// Staged operation sets and the display/result payloads built from them

use serde::{Deserialize, Serialize};

use crate::entities::{
    ContainerDescriptor, InventoryRecord, Keychain, MatchedRecord, Sticker, UnmatchedRecord,
};
use crate::value_objects::{SelectionKey, StagingToken, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Deposit,
    Withdraw,
}

impl TransferDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferDirection::Deposit => "deposit",
            TransferDirection::Withdraw => "withdraw",
        }
    }
}

/// A stored record proposed for removal or transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedRecordRef {
    pub record_id: i64,
    pub asset_id: String,
    pub hash_name: String,
}

impl From<&InventoryRecord> for StagedRecordRef {
    fn from(record: &InventoryRecord) -> Self {
        Self {
            record_id: record.id,
            asset_id: record.asset_id.clone(),
            hash_name: record.hash_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDiff {
    pub user_id: UserId,
    pub items_to_add: Vec<MatchedRecord>,
    pub items_to_remove: Vec<StagedRecordRef>,
    #[serde(default)]
    pub containers: Vec<ContainerDescriptor>,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerTransferDiff {
    pub user_id: UserId,
    pub container_id: i64,
    pub direction: TransferDirection,
    pub candidates: Vec<StagedRecordRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<ContainerDescriptor>,
    pub created_at_ms: i64,
}

/// Payload held in the session under a staging token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StagedDiff {
    Import(ImportDiff),
    Transfer(ContainerTransferDiff),
}

impl StagedDiff {
    pub fn user_id(&self) -> &UserId {
        match self {
            StagedDiff::Import(diff) => &diff.user_id,
            StagedDiff::Transfer(diff) => &diff.user_id,
        }
    }
}

/// Display-only price breakdown attached to a diff entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPricing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_price: Option<f64>,
    pub sticker_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keychain_price: Option<f64>,
    /// Base + stickers + keychain.
    pub display_total: f64,
    /// Base + keychain; applied stickers cannot be removed for resale.
    pub tradeable_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub key: String,
    pub asset_id: String,
    pub hash_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
    pub catalog_item_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<i64>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keychain: Option<Keychain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_tag: Option<String>,
    #[serde(default)]
    pub pricing: EntryPricing,
}

impl DiffEntry {
    pub fn for_addition(matched: &MatchedRecord) -> Self {
        let record = &matched.record;
        Self {
            key: SelectionKey::Add(record.asset_id.clone()).to_string(),
            asset_id: record.asset_id.clone(),
            hash_name: record.hash_name.clone(),
            name: record.name.clone(),
            record_id: None,
            catalog_item_id: matched.catalog_item_id,
            float_value: record.float_value,
            pattern: record.pattern,
            stickers: record.stickers.clone(),
            keychain: record.keychain.clone(),
            name_tag: record.name_tag.clone(),
            pricing: EntryPricing::default(),
        }
    }

    pub fn for_stored(key: SelectionKey, record: &InventoryRecord) -> Self {
        Self {
            key: key.to_string(),
            asset_id: record.asset_id.clone(),
            hash_name: record.hash_name.clone(),
            name: record.name.clone(),
            record_id: Some(record.id),
            catalog_item_id: record.catalog_item_id,
            float_value: record.float_value,
            pattern: record.pattern,
            stickers: record.stickers.clone(),
            keychain: record.keychain.clone(),
            name_tag: record.name_tag.clone(),
            pricing: EntryPricing::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    pub token: StagingToken,
    pub to_add: Vec<DiffEntry>,
    pub to_remove: Vec<DiffEntry>,
    pub unmatched: Vec<UnmatchedRecord>,
    pub containers: Vec<ContainerDescriptor>,
    pub add_value: f64,
    pub remove_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPreview {
    pub token: StagingToken,
    pub container_id: i64,
    pub direction: TransferDirection,
    pub entries: Vec<DiffEntry>,
    /// Stored records whose asset id was rewritten by property matching.
    pub healed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<ContainerDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyResult {
    pub added: usize,
    pub removed: usize,
    pub moved: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl ApplyResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }
}
