use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::entities::{
    CatalogItem, CatalogSeed, Container, ContainerDescriptor, InventoryRecord,
    NewInventoryRecord, PriceQuote, PriceSample,
};
use crate::value_objects::UserId;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A single record was refused; the surrounding transaction may continue.
    #[error("record rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

/// Write handle valid for the duration of one `in_transaction` call.
pub trait InventoryTransaction {
    /// Creates or refreshes the marketplace container with this external id.
    fn sync_container(
        &mut self,
        user: &UserId,
        descriptor: &ContainerDescriptor,
    ) -> Result<i64, StoreError>;

    /// Refreshes name, reported count and modification date. Returns false for manual containers.
    fn refresh_container(
        &mut self,
        container_id: i64,
        descriptor: &ContainerDescriptor,
    ) -> Result<bool, StoreError>;

    /// Deletes records that are not inside any container.
    fn delete_active_records(
        &mut self,
        user: &UserId,
        asset_ids: &[String],
    ) -> Result<usize, StoreError>;

    fn insert_record(&mut self, record: &NewInventoryRecord) -> Result<i64, StoreError>;

    fn assign_container(
        &mut self,
        user: &UserId,
        record_ids: &[i64],
        container_id: Option<i64>,
    ) -> Result<usize, StoreError>;
}

pub type TransactionWork<'a> =
    dyn FnMut(&mut dyn InventoryTransaction) -> Result<(), StoreError> + 'a;

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn find_active_inventory(&self, user: &UserId) -> anyhow::Result<Vec<InventoryRecord>>;
    async fn find_container_contents(
        &self,
        container_id: i64,
    ) -> anyhow::Result<Vec<InventoryRecord>>;
    async fn find_records(&self, ids: &[i64]) -> anyhow::Result<Vec<InventoryRecord>>;
    async fn find_container(&self, container_id: i64) -> anyhow::Result<Option<Container>>;
    async fn list_containers(&self, user: &UserId) -> anyhow::Result<Vec<Container>>;
    async fn create_manual_container(&self, user: &UserId, name: &str)
        -> anyhow::Result<Container>;
    async fn rename_container(&self, container_id: i64, name: &str) -> anyhow::Result<()>;
    /// Deletes the container; its contents return to the active inventory.
    async fn delete_container(&self, container_id: i64) -> anyhow::Result<usize>;
    /// Returns `false` when the record is gone or another record already holds `asset_id`.
    async fn update_asset_id(&self, record_id: i64, asset_id: &str) -> anyhow::Result<bool>;
    async fn ping(&self) -> anyhow::Result<()>;

    /// Runs `work` in one transaction: commit on `Ok`, roll back on `Err`.
    fn in_transaction(&self, work: &mut TransactionWork<'_>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Entries for the given hash names, in ascending id order.
    async fn find_by_hash_names(&self, hash_names: &[String]) -> anyhow::Result<Vec<CatalogItem>>;
    async fn upsert_items(&self, items: &[CatalogSeed]) -> anyhow::Result<usize>;
}

#[async_trait]
pub trait PriceRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn latest_quotes(
        &self,
        hash_names: &[String],
    ) -> anyhow::Result<HashMap<String, PriceQuote>>;
    async fn samples_between(
        &self,
        hash_name: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> anyhow::Result<Vec<PriceSample>>;
    async fn insert_samples(&self, samples: &[PriceSample]) -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;
}
