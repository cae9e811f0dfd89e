use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::{HealthCheckService, InventoryRepository, PriceRepository};

pub struct DefaultHealthService {
    inventory_repo: Arc<dyn InventoryRepository>,
    price_repo: Arc<dyn PriceRepository>,
}

impl DefaultHealthService {
    pub fn new(
        inventory_repo: Arc<dyn InventoryRepository>,
        price_repo: Arc<dyn PriceRepository>,
    ) -> Self {
        Self {
            inventory_repo,
            price_repo,
        }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.inventory_repo.ping().await.map(|_| true)
    }

    async fn check_price_store(&self) -> anyhow::Result<bool> {
        self.price_repo.ping().await.map(|_| true)
    }
}
