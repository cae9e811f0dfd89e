use std::sync::Arc;

use backend_domain::ports::{
    CatalogRepository, HealthCheckService, InventoryRepository, PriceRepository, SessionStore,
};
use backend_domain::RuntimeConfig;

use crate::{Metrics, StagedTransactionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub inventory_repo: Arc<dyn InventoryRepository>,
    pub catalog_repo: Arc<dyn CatalogRepository>,
    pub price_repo: Arc<dyn PriceRepository>,
    pub session_store: Arc<dyn SessionStore>,
    pub health: Arc<dyn HealthCheckService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn staging(&self) -> StagedTransactionStore<'_> {
        StagedTransactionStore::new(self.session_store.as_ref())
    }
}
