use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::entities::{RawDescription, RawProperty, RawSnapshot, NormalizedRecord};
use crate::services::embedded_text::{
    parse_keychain, parse_name_tag, parse_stattrak_kills, parse_stickers, KEYCHAIN_INFO_LINE,
    NAME_TAG_LINE, STICKER_INFO_LINE,
};
use crate::value_objects::{ItemType, QUALITY_TAG_CATEGORY, TYPE_TAG_CATEGORY};

pub const PROPERTY_PATTERN: u32 = 1;
pub const PROPERTY_FLOAT: u32 = 2;
pub const STORAGE_UNIT_MARKER: &str = "Storage Unit";

const INSPECT_ACTION_MARKER: &str = "csgo_econ_action_preview";
const SEALED_GRAFFITI_MARKER: &str = "Sealed Graffiti";
const ASSET_ID_PLACEHOLDER: &str = "%assetid%";
const OWNER_PLACEHOLDER: &str = "%owner_steamid%";

/// Turns raw exports into normalized records.
#[derive(Debug, Clone, Default)]
pub struct SnapshotParser {
    owner_id: Option<String>,
}

impl SnapshotParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner id substituted into inspect link templates.
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        self.owner_id = if owner_id.trim().is_empty() {
            None
        } else {
            Some(owner_id)
        };
        self
    }

    pub fn parse(&self, snapshot: &RawSnapshot) -> Vec<NormalizedRecord> {
        self.parse_all(&[snapshot])
    }

    /// Parses several exports as one pass; an asset id seen twice keeps its first record.
    pub fn parse_all(&self, snapshots: &[&RawSnapshot]) -> Vec<NormalizedRecord> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for snapshot in snapshots {
            let descriptions: HashMap<(&str, &str), &RawDescription> = snapshot
                .descriptions
                .iter()
                .map(|desc| ((desc.classid.as_str(), desc.instanceid.as_str()), desc))
                .collect();
            let properties: HashMap<&str, &[RawProperty]> = snapshot
                .asset_properties
                .iter()
                .map(|entry| (entry.assetid.as_str(), entry.asset_properties.as_slice()))
                .collect();

            for asset in &snapshot.assets {
                let Some(description) =
                    descriptions.get(&(asset.classid.as_str(), asset.instanceid.as_str()))
                else {
                    debug!(
                        asset_id = %asset.assetid,
                        classid = %asset.classid,
                        "asset has no description, skipped"
                    );
                    continue;
                };
                if is_excluded(description) {
                    continue;
                }
                if !seen.insert(asset.assetid.clone()) {
                    warn!(asset_id = %asset.assetid, "duplicate asset id in snapshot, keeping first");
                    continue;
                }
                let props = properties.get(asset.assetid.as_str()).copied().unwrap_or(&[]);
                records.push(self.build_record(&asset.assetid, description, props));
            }
        }
        records
    }

    fn build_record(
        &self,
        asset_id: &str,
        description: &RawDescription,
        properties: &[RawProperty],
    ) -> NormalizedRecord {
        let hash_name = if description.market_hash_name.trim().is_empty() {
            description.name.clone()
        } else {
            description.market_hash_name.clone()
        };
        let (stattrak, souvenir) = quality_flags(description);

        let stattrak_kills = description
            .descriptions
            .iter()
            .find_map(|line| parse_stattrak_kills(&line.value));

        NormalizedRecord {
            asset_id: asset_id.to_string(),
            class_id: description.classid.clone(),
            instance_id: description.instanceid.clone(),
            name: description.name.clone(),
            hash_name,
            float_value: property(properties, PROPERTY_FLOAT).and_then(|p| p.float_value),
            pattern: property(properties, PROPERTY_PATTERN)
                .and_then(|p| p.int_value.or_else(|| p.float_value.map(|v| v as i64))),
            inspect_link: self.inspect_link(asset_id, description),
            stattrak,
            souvenir,
            stattrak_kills,
            stickers: description
                .line(STICKER_INFO_LINE)
                .map(|line| parse_stickers(&line.value))
                .unwrap_or_default(),
            keychain: description
                .line(KEYCHAIN_INFO_LINE)
                .and_then(|line| parse_keychain(&line.value)),
            name_tag: description
                .line(NAME_TAG_LINE)
                .and_then(|line| parse_name_tag(&line.value)),
        }
    }

    fn inspect_link(&self, asset_id: &str, description: &RawDescription) -> Option<String> {
        let template = description
            .actions
            .iter()
            .map(|action| action.link.as_str())
            .find(|link| link.contains(INSPECT_ACTION_MARKER))?;
        let mut link = template.replace(ASSET_ID_PLACEHOLDER, asset_id);
        if let Some(owner) = &self.owner_id {
            link = link.replace(OWNER_PLACEHOLDER, owner);
        }
        Some(link)
    }
}

/// Collectibles, unsealed graffiti and storage units never become inventory records.
pub fn is_excluded(description: &RawDescription) -> bool {
    let item_type = description
        .tag(TYPE_TAG_CATEGORY)
        .map(|tag| ItemType::from(tag.internal_name.as_str()))
        .unwrap_or(ItemType::Unknown);
    match item_type {
        ItemType::Collectible => true,
        ItemType::Spray => !description.market_hash_name.contains(SEALED_GRAFFITI_MARKER),
        ItemType::Tool => {
            description.name.contains(STORAGE_UNIT_MARKER)
                || description.market_hash_name.contains(STORAGE_UNIT_MARKER)
        }
        ItemType::Other(_) | ItemType::Unknown => false,
    }
}

/// StatTrak and Souvenir flags; the `Quality` tag wins over the display name.
fn quality_flags(description: &RawDescription) -> (bool, bool) {
    match description.tag(QUALITY_TAG_CATEGORY) {
        Some(tag) => {
            let quality = tag.internal_name.to_lowercase();
            (quality.contains("strange"), quality.contains("tournament"))
        }
        None => (
            description.name.contains("StatTrak"),
            description.name.contains("Souvenir"),
        ),
    }
}

fn property(properties: &[RawProperty], id: u32) -> Option<&RawProperty> {
    properties.iter().find(|prop| prop.propertyid == id)
}
