// Container (storage box) entity
// Either sourced from the marketplace (external id set) or created by hand

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

pub const DEFAULT_CONTAINER_NAME: &str = "Storage Unit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Container {
    /// Manual containers have no external id and are never touched by snapshot sync.
    pub fn is_manual(&self) -> bool {
        self.external_id.is_none()
    }
}

/// Container metadata extracted from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDescriptor {
    pub external_id: String,
    pub name: String,
    pub reported_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub container: Container,
    pub actual_count: u32,
    pub value: f64,
    /// False when the marketplace-declared count disagrees with the stored contents.
    pub in_sync: bool,
}
