use async_trait::async_trait;

/// Short-lived per-session key/value storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set(&self, session: &str, key: &str, value: String) -> anyhow::Result<()>;
    async fn get(&self, session: &str, key: &str) -> anyhow::Result<Option<String>>;
    async fn remove(&self, session: &str, key: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
    async fn check_price_store(&self) -> anyhow::Result<bool>;
}
