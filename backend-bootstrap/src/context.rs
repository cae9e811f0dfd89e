use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clickhouse::Client;
use tracing::{info, warn};

use backend_application::{AppState, Metrics};
use backend_domain::{CatalogRepository, InventoryRepository, PriceRepository};
use backend_infrastructure::{
    AppConfig, CatalogSeedFile, ClickhousePriceRepository, DefaultHealthService,
    MemorySessionStore, SqliteInventoryStore,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config_path: Option<&str>) -> Result<Self> {
        let config = AppConfig::load(config_path).await?;
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let store = Arc::new(SqliteInventoryStore::open(&db_config.database_path)?);
        store.ensure_schema().await?;
        info!(path = %db_config.database_path, "inventory store ready");

        if let Some(path) = &config.catalog_path {
            let seeds = CatalogSeedFile::load(path).await?;
            let written = store.upsert_items(&seeds).await?;
            info!(path = %path, entries = written, "catalog seed applied");
        }

        let mut clickhouse = Client::default()
            .with_url(&db_config.clickhouse_url)
            .with_database(&db_config.clickhouse_database);
        if let Some(user) = &db_config.clickhouse_user {
            clickhouse = clickhouse.with_user(user);
        }
        if let Some(password) = &db_config.clickhouse_password {
            clickhouse = clickhouse.with_password(password);
        }

        let prices = Arc::new(ClickhousePriceRepository::new(
            clickhouse,
            db_config.clickhouse_database.clone(),
        ));
        // Prices are display-only; the engine runs without them.
        if let Err(err) = prices.ensure_schema().await {
            warn!("price store unavailable at startup, continuing without prices: {}", err);
        }

        let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(
            runtime_config.staging_ttl_seconds,
        )));
        let health = Arc::new(DefaultHealthService::new(store.clone(), prices.clone()));

        let state = AppState {
            config: runtime_config,
            inventory_repo: store.clone(),
            catalog_repo: store,
            price_repo: prices,
            session_store: sessions,
            health,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
