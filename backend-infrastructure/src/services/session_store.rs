use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use backend_domain::ports::SessionStore;

struct SessionEntry {
    value: String,
    expires_at: Instant,
}

/// In-process session storage; entries expire after `ttl` and vanish on restart.
pub struct MemorySessionStore {
    ttl: Duration,
    entries: RwLock<HashMap<(String, String), SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, session: &str, key: &str, value: String) -> anyhow::Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            (session.to_string(), key.to_string()),
            SessionEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, session: &str, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(session.to_string(), key.to_string()))
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    async fn remove(&self, session: &str, key: &str) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .remove(&(session.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_are_scoped_to_their_session() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        store
            .set("u1", "staged:a", "diff".to_string())
            .await
            .expect("set");
        assert_eq!(
            store.get("u1", "staged:a").await.expect("get").as_deref(),
            Some("diff")
        );
        assert!(store.get("u2", "staged:a").await.expect("get").is_none());

        store.remove("u1", "staged:a").await.expect("remove");
        assert!(store.get("u1", "staged:a").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let store = MemorySessionStore::new(Duration::ZERO);
        store
            .set("u1", "staged:a", "diff".to_string())
            .await
            .expect("set");
        assert!(store.get("u1", "staged:a").await.expect("get").is_none());
    }
}
