use serde::{Deserialize, Serialize};

use crate::entities::{ContainerSummary, PriceSample};

#[derive(Debug, Deserialize)]
pub struct ImportPreviewRequest {
    #[serde(default)]
    pub tradeable: String,
    #[serde(default)]
    pub trade_locked: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferPreviewRequest {
    #[serde(default)]
    pub snapshot: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub token: String,
    #[serde(default)]
    pub selected: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContainerNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRecordsRequest {
    pub record_ids: Vec<i64>,
    /// `None` moves the records back to the active inventory.
    #[serde(default)]
    pub container_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PriceTrendQuery {
    pub hash_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceSamplesPayload {
    pub samples: Vec<PriceSample>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryValue {
    pub active_count: u32,
    pub active_value: f64,
    pub containers: Vec<ContainerSummary>,
    pub total_value: f64,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub staging_ttl_seconds: u64,
    pub trend_tolerance_minutes: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3234".to_string(),
            api_token: None,
            staging_ttl_seconds: 3600,
            trend_tolerance_minutes: 180,
            max_body_bytes: 16 * 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
}
