// Storage unit metadata from a snapshot

use std::collections::HashSet;

use tracing::warn;

use crate::entities::{ContainerDescriptor, RawDescription, RawSnapshot, DEFAULT_CONTAINER_NAME};
use crate::services::embedded_text::{
    parse_first_integer, parse_modification_date, parse_name_tag, ITEMS_COUNT_LINE,
    MODIFICATION_DATE_LINE, NAME_TAG_LINE,
};
use crate::services::snapshot_parser::STORAGE_UNIT_MARKER;
use crate::value_objects::{ItemType, TYPE_TAG_CATEGORY};

/// One descriptor per storage unit asset, deduplicated by asset id across snapshots.
pub fn extract_containers(snapshots: &[&RawSnapshot]) -> Vec<ContainerDescriptor> {
    let mut seen = HashSet::new();
    let mut containers = Vec::new();
    for snapshot in snapshots {
        for description in snapshot.descriptions.iter().filter(|d| is_storage_unit(d)) {
            let assets = snapshot.assets.iter().filter(|asset| {
                asset.classid == description.classid && asset.instanceid == description.instanceid
            });
            for asset in assets {
                if seen.insert(asset.assetid.clone()) {
                    containers.push(describe(&asset.assetid, description));
                }
            }
        }
    }
    containers
}

fn is_storage_unit(description: &RawDescription) -> bool {
    let is_tool = description
        .tag(TYPE_TAG_CATEGORY)
        .map(|tag| ItemType::from(tag.internal_name.as_str()) == ItemType::Tool)
        .unwrap_or(false);
    is_tool && description.market_hash_name == STORAGE_UNIT_MARKER
}

fn describe(asset_id: &str, description: &RawDescription) -> ContainerDescriptor {
    let name = line_value(description, NAME_TAG_LINE, "Name Tag:")
        .and_then(parse_name_tag)
        .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string());
    let reported_count = line_value(description, ITEMS_COUNT_LINE, "Number of Items")
        .and_then(parse_first_integer)
        .unwrap_or(0);
    let modified_at = match line_value(description, MODIFICATION_DATE_LINE, "Modification Date:")
        .map(parse_modification_date)
    {
        Some(Ok(date)) => date,
        Some(Err(raw)) => {
            warn!(asset_id, value = %raw, "unparseable storage unit modification date");
            None
        }
        None => None,
    };

    ContainerDescriptor {
        external_id: asset_id.to_string(),
        name,
        reported_count,
        modified_at,
    }
}

/// Line value by name, falling back to the first line whose text carries `label`.
fn line_value<'a>(description: &'a RawDescription, name: &str, label: &str) -> Option<&'a str> {
    description
        .line(name)
        .or_else(|| description.descriptions.iter().find(|line| line.value.contains(label)))
        .map(|line| line.value.as_str())
}
