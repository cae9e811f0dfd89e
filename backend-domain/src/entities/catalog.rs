// Catalog entity
// Canonical definition of a tradeable item type, keyed by its market hash name

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub hash_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub stattrak_available: bool,
    #[serde(default)]
    pub souvenir_available: bool,
}

/// Catalog row as supplied by a seed file, before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSeed {
    pub hash_name: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub stattrak_available: bool,
    #[serde(default)]
    pub souvenir_available: bool,
}
