// Normalized snapshot records

use serde::{Deserialize, Serialize};

use crate::entities::{Keychain, Sticker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub asset_id: String,
    pub class_id: String,
    pub instance_id: String,
    pub name: String,
    pub hash_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspect_link: Option<String>,
    pub stattrak: bool,
    pub souvenir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stattrak_kills: Option<i64>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keychain: Option<Keychain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_tag: Option<String>,
}

/// A snapshot record resolved to a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRecord {
    pub catalog_item_id: i64,
    pub record: NormalizedRecord,
}

impl MatchedRecord {
    pub fn asset_id(&self) -> &str {
        &self.record.asset_id
    }
}

/// A snapshot record with no catalog entry; reported, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedRecord {
    pub asset_id: String,
    pub name: String,
    pub hash_name: String,
}

impl From<&NormalizedRecord> for UnmatchedRecord {
    fn from(record: &NormalizedRecord) -> Self {
        Self {
            asset_id: record.asset_id.clone(),
            name: record.name.clone(),
            hash_name: record.hash_name.clone(),
        }
    }
}
