// Inventory record entity
// One physically held unit, owned by exactly one user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{StickerKind, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub name: String,
    pub kind: StickerKind,
    pub slot: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wear: Option<f64>,
}

impl Sticker {
    /// Market hash name of the applied sticker or patch, e.g. `Sticker | Natus Vincere | Katowice 2014`.
    pub fn hash_name(&self) -> String {
        format!("{} | {}", self.kind.as_str(), self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keychain {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<i64>,
}

impl Keychain {
    pub fn hash_name(&self) -> String {
        format!("Charm | {}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: i64,
    pub user_id: UserId,
    pub asset_id: String,
    pub catalog_item_id: i64,
    pub hash_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stattrak_kills: Option<i64>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keychain: Option<Keychain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspect_link: Option<String>,
    pub acquired_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_price: Option<f64>,
}

impl InventoryRecord {
    pub fn is_active(&self) -> bool {
        self.container_id.is_none()
    }
}

/// Insert payload for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryRecord {
    pub user_id: UserId,
    pub asset_id: String,
    pub catalog_item_id: i64,
    pub float_value: Option<f64>,
    pub pattern: Option<i64>,
    pub stattrak_kills: Option<i64>,
    pub stickers: Vec<Sticker>,
    pub keychain: Option<Keychain>,
    pub name_tag: Option<String>,
    pub inspect_link: Option<String>,
    pub container_id: Option<i64>,
    pub acquired_at: DateTime<Utc>,
    pub acquisition_price: Option<f64>,
}
