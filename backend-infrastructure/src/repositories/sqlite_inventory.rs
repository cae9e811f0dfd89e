// SQLite store for inventory records, containers and the item catalog

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{
    params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, Transaction,
};
use tracing::{debug, warn};

use backend_domain::ports::{
    CatalogRepository, InventoryRepository, InventoryTransaction, StoreError, TransactionWork,
};
use backend_domain::{
    CatalogItem, CatalogSeed, Container, ContainerDescriptor, InventoryRecord, Keychain,
    NewInventoryRecord, Sticker, UserId,
};

/// Upper bound on bound parameters per `IN (...)` list.
const IN_CHUNK: usize = 500;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS catalog_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hash_name TEXT NOT NULL,
    name TEXT NOT NULL,
    category TEXT,
    rarity TEXT,
    item_type TEXT,
    stattrak_available INTEGER NOT NULL DEFAULT 0,
    souvenir_available INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_catalog_items_hash_name ON catalog_items(hash_name);

CREATE TABLE IF NOT EXISTS containers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    external_id TEXT,
    reported_count INTEGER,
    modified_at TEXT,
    UNIQUE (user_id, external_id)
);

CREATE TABLE IF NOT EXISTS inventory_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    asset_id TEXT NOT NULL CHECK (length(asset_id) > 0),
    catalog_item_id INTEGER NOT NULL REFERENCES catalog_items(id),
    float_value REAL,
    pattern INTEGER,
    stattrak_kills INTEGER,
    stickers TEXT NOT NULL DEFAULT '[]',
    keychain TEXT,
    name_tag TEXT,
    container_id INTEGER REFERENCES containers(id) ON DELETE SET NULL,
    inspect_link TEXT,
    acquired_at TEXT NOT NULL,
    acquisition_price REAL
);
CREATE INDEX IF NOT EXISTS idx_inventory_records_user_container
    ON inventory_records(user_id, container_id);
CREATE INDEX IF NOT EXISTS idx_inventory_records_container ON inventory_records(container_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_inventory_records_user_asset
    ON inventory_records(user_id, asset_id);
"#;

const RECORD_COLUMNS: &str =
    "r.id, r.user_id, r.asset_id, r.catalog_item_id, c.hash_name, c.name, \
     r.float_value, r.pattern, r.stattrak_kills, r.stickers, r.keychain, r.name_tag, \
     r.container_id, r.inspect_link, r.acquired_at, r.acquisition_price";

const CONTAINER_COLUMNS: &str = "id, user_id, name, external_id, reported_count, modified_at";

const CATALOG_COLUMNS: &str =
    "id, hash_name, name, category, rarity, item_type, stattrak_available, souvenir_available";

#[derive(Clone)]
pub struct SqliteInventoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteInventoryStore {
    pub fn open(path: &str) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = store.lock()?;
            f(&mut conn).map_err(anyhow::Error::from)
        })
        .await?
    }
}

#[async_trait]
impl InventoryRepository for SqliteInventoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.with_conn(|conn| conn.execute_batch(SCHEMA)).await
    }

    async fn find_active_inventory(&self, user: &UserId) -> Result<Vec<InventoryRecord>> {
        let user = user.as_str().to_string();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM inventory_records r JOIN catalog_items c ON c.id = r.catalog_item_id \
                 WHERE r.user_id = ?1 AND r.container_id IS NULL ORDER BY r.id",
                RECORD_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([user], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn find_container_contents(&self, container_id: i64) -> Result<Vec<InventoryRecord>> {
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM inventory_records r JOIN catalog_items c ON c.id = r.catalog_item_id \
                 WHERE r.container_id = ?1 ORDER BY r.id",
                RECORD_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([container_id], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn find_records(&self, ids: &[i64]) -> Result<Vec<InventoryRecord>> {
        let ids = ids.to_vec();
        self.with_conn(move |conn| {
            let mut records = Vec::with_capacity(ids.len());
            for chunk in ids.chunks(IN_CHUNK) {
                let sql = format!(
                    "SELECT {} FROM inventory_records r JOIN catalog_items c ON c.id = r.catalog_item_id \
                     WHERE r.id IN ({}) ORDER BY r.id",
                    RECORD_COLUMNS,
                    placeholders(chunk.len())
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(chunk.iter()), record_from_row)?;
                for row in rows {
                    records.push(row?);
                }
            }
            Ok(records)
        })
        .await
    }

    async fn find_container(&self, container_id: i64) -> Result<Option<Container>> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM containers WHERE id = ?1", CONTAINER_COLUMNS),
                [container_id],
                container_from_row,
            )
            .optional()
        })
        .await
    }

    async fn list_containers(&self, user: &UserId) -> Result<Vec<Container>> {
        let user = user.as_str().to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM containers WHERE user_id = ?1 ORDER BY id",
                CONTAINER_COLUMNS
            ))?;
            let containers = stmt
                .query_map([user], container_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(containers)
        })
        .await
    }

    async fn create_manual_container(&self, user: &UserId, name: &str) -> Result<Container> {
        let user = user.clone();
        let name = name.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO containers (user_id, name, external_id, reported_count, modified_at) \
                 VALUES (?1, ?2, NULL, NULL, NULL)",
                params![user.as_str(), name],
            )?;
            Ok(Container {
                id: conn.last_insert_rowid(),
                user_id: user,
                name,
                external_id: None,
                reported_count: None,
                modified_at: None,
            })
        })
        .await
    }

    async fn rename_container(&self, container_id: i64, name: &str) -> Result<()> {
        let name = name.to_string();
        let changed = self
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE containers SET name = ?1 WHERE id = ?2",
                    params![name, container_id],
                )
            })
            .await?;
        if changed == 0 {
            return Err(anyhow!("container {} not found", container_id));
        }
        Ok(())
    }

    async fn delete_container(&self, container_id: i64) -> Result<usize> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let released = tx.execute(
                "UPDATE inventory_records SET container_id = NULL WHERE container_id = ?1",
                [container_id],
            )?;
            tx.execute("DELETE FROM containers WHERE id = ?1", [container_id])?;
            tx.commit()?;
            Ok(released)
        })
        .await
    }

    async fn update_asset_id(&self, record_id: i64, asset_id: &str) -> Result<bool> {
        let asset_id = asset_id.to_string();
        self.with_conn(move |conn| {
            match conn.execute(
                "UPDATE inventory_records SET asset_id = ?1 WHERE id = ?2",
                params![asset_id, record_id],
            ) {
                Ok(changed) => Ok(changed > 0),
                Err(rusqlite::Error::SqliteFailure(failure, _))
                    if failure.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(err) => Err(err),
            }
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.with_conn(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .await
            .map(|_| ())
    }

    fn in_transaction(&self, work: &mut TransactionWork<'_>) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(unavailable)?;
        let mut handle = SqliteTransaction { tx };
        match work(&mut handle) {
            Ok(()) => handle.tx.commit().map_err(unavailable),
            Err(err) => {
                if let Err(rollback_err) = handle.tx.rollback() {
                    warn!("transaction rollback failed: {}", rollback_err);
                }
                debug!("transaction rolled back: {}", err);
                Err(err)
            }
        }
    }
}

#[async_trait]
impl CatalogRepository for SqliteInventoryStore {
    async fn find_by_hash_names(&self, hash_names: &[String]) -> Result<Vec<CatalogItem>> {
        let hash_names = hash_names.to_vec();
        self.with_conn(move |conn| {
            let mut items = Vec::new();
            for chunk in hash_names.chunks(IN_CHUNK) {
                let sql = format!(
                    "SELECT {} FROM catalog_items WHERE hash_name IN ({}) ORDER BY id",
                    CATALOG_COLUMNS,
                    placeholders(chunk.len())
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(chunk.iter()), catalog_from_row)?;
                for row in rows {
                    items.push(row?);
                }
            }
            items.sort_by_key(|item: &CatalogItem| item.id);
            Ok(items)
        })
        .await
    }

    /// Refreshes the first entry carrying each hash name, inserting when there is none.
    async fn upsert_items(&self, items: &[CatalogSeed]) -> Result<usize> {
        let items = items.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut written = 0;
            for item in &items {
                let updated = tx.execute(
                    "UPDATE catalog_items SET name = ?2, category = ?3, rarity = ?4, item_type = ?5, \
                     stattrak_available = ?6, souvenir_available = ?7 \
                     WHERE id = (SELECT MIN(id) FROM catalog_items WHERE hash_name = ?1)",
                    params![
                        item.hash_name,
                        item.name,
                        item.category,
                        item.rarity,
                        item.item_type,
                        item.stattrak_available,
                        item.souvenir_available,
                    ],
                )?;
                if updated == 0 {
                    tx.execute(
                        "INSERT INTO catalog_items (hash_name, name, category, rarity, item_type, \
                         stattrak_available, souvenir_available) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            item.hash_name,
                            item.name,
                            item.category,
                            item.rarity,
                            item.item_type,
                            item.stattrak_available,
                            item.souvenir_available,
                        ],
                    )?;
                }
                written += 1;
            }
            tx.commit()?;
            Ok(written)
        })
        .await
    }
}

struct SqliteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl InventoryTransaction for SqliteTransaction<'_> {
    fn sync_container(
        &mut self,
        user: &UserId,
        descriptor: &ContainerDescriptor,
    ) -> Result<i64, StoreError> {
        let existing: Option<i64> = self
            .tx
            .query_row(
                "SELECT id FROM containers WHERE user_id = ?1 AND external_id = ?2",
                params![user.as_str(), descriptor.external_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;

        match existing {
            Some(id) => {
                self.refresh_container(id, descriptor)?;
                Ok(id)
            }
            None => {
                self.tx
                    .execute(
                        "INSERT INTO containers (user_id, name, external_id, reported_count, modified_at) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            user.as_str(),
                            descriptor.name,
                            descriptor.external_id,
                            descriptor.reported_count,
                            descriptor.modified_at,
                        ],
                    )
                    .map_err(classify)?;
                Ok(self.tx.last_insert_rowid())
            }
        }
    }

    fn refresh_container(
        &mut self,
        container_id: i64,
        descriptor: &ContainerDescriptor,
    ) -> Result<bool, StoreError> {
        let changed = self
            .tx
            .execute(
                "UPDATE containers SET name = ?1, reported_count = ?2, \
                 modified_at = COALESCE(?3, modified_at) \
                 WHERE id = ?4 AND external_id IS NOT NULL AND external_id = ?5",
                params![
                    descriptor.name,
                    descriptor.reported_count,
                    descriptor.modified_at,
                    container_id,
                    descriptor.external_id,
                ],
            )
            .map_err(classify)?;
        Ok(changed > 0)
    }

    fn delete_active_records(
        &mut self,
        user: &UserId,
        asset_ids: &[String],
    ) -> Result<usize, StoreError> {
        let mut deleted = 0;
        for chunk in asset_ids.chunks(IN_CHUNK) {
            let sql = format!(
                "DELETE FROM inventory_records \
                 WHERE user_id = ? AND container_id IS NULL AND asset_id IN ({})",
                placeholders(chunk.len())
            );
            let values = std::iter::once(user.as_str()).chain(chunk.iter().map(String::as_str));
            deleted += self
                .tx
                .execute(&sql, params_from_iter(values))
                .map_err(classify)?;
        }
        Ok(deleted)
    }

    /// Runs in its own savepoint so a rejected row leaves nothing behind.
    fn insert_record(&mut self, record: &NewInventoryRecord) -> Result<i64, StoreError> {
        let stickers = serde_json::to_string(&record.stickers)
            .map_err(|err| StoreError::Rejected(format!("stickers: {}", err)))?;
        let keychain = record
            .keychain
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| StoreError::Rejected(format!("keychain: {}", err)))?;

        let savepoint = self.tx.savepoint().map_err(unavailable)?;
        savepoint
            .execute(
                "INSERT INTO inventory_records (user_id, asset_id, catalog_item_id, float_value, \
                 pattern, stattrak_kills, stickers, keychain, name_tag, container_id, inspect_link, \
                 acquired_at, acquisition_price) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    record.user_id.as_str(),
                    record.asset_id,
                    record.catalog_item_id,
                    record.float_value,
                    record.pattern,
                    record.stattrak_kills,
                    stickers,
                    keychain,
                    record.name_tag,
                    record.container_id,
                    record.inspect_link,
                    record.acquired_at,
                    record.acquisition_price,
                ],
            )
            .map_err(classify)?;
        let id = savepoint.last_insert_rowid();
        savepoint.commit().map_err(unavailable)?;
        Ok(id)
    }

    fn assign_container(
        &mut self,
        user: &UserId,
        record_ids: &[i64],
        container_id: Option<i64>,
    ) -> Result<usize, StoreError> {
        let mut moved = 0;
        for chunk in record_ids.chunks(IN_CHUNK) {
            let sql = format!(
                "UPDATE inventory_records SET container_id = ? WHERE user_id = ? AND id IN ({})",
                placeholders(chunk.len())
            );
            let mut values: Vec<rusqlite::types::Value> = Vec::with_capacity(chunk.len() + 2);
            values.push(container_id.into());
            values.push(user.as_str().to_string().into());
            values.extend(chunk.iter().map(|id| rusqlite::types::Value::from(*id)));
            moved += self
                .tx
                .execute(&sql, params_from_iter(values))
                .map_err(classify)?;
        }
        Ok(moved)
    }
}

/// Constraint violations refuse one record; anything else takes the transaction down.
fn classify(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Rejected(err.to_string())
        }
        rusqlite::Error::ToSqlConversionFailure(_) => StoreError::Rejected(err.to_string()),
        _ => unavailable(err),
    }
}

fn unavailable(err: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(err.into())
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn record_from_row(row: &Row) -> rusqlite::Result<InventoryRecord> {
    let keychain: Option<String> = row.get(10)?;
    let keychain = keychain
        .map(|raw| serde_json::from_str::<Keychain>(&raw))
        .transpose()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(err)))?;
    let stickers: Vec<Sticker> = json_column(row, 9)?;
    let acquired_at: DateTime<Utc> = row.get(14)?;

    Ok(InventoryRecord {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        asset_id: row.get(2)?,
        catalog_item_id: row.get(3)?,
        hash_name: row.get(4)?,
        name: row.get(5)?,
        float_value: row.get(6)?,
        pattern: row.get(7)?,
        stattrak_kills: row.get(8)?,
        stickers,
        keychain,
        name_tag: row.get(11)?,
        container_id: row.get(12)?,
        inspect_link: row.get(13)?,
        acquired_at,
        acquisition_price: row.get(15)?,
    })
}

fn container_from_row(row: &Row) -> rusqlite::Result<Container> {
    Ok(Container {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        name: row.get(2)?,
        external_id: row.get(3)?,
        reported_count: row.get(4)?,
        modified_at: row.get(5)?,
    })
}

fn catalog_from_row(row: &Row) -> rusqlite::Result<CatalogItem> {
    Ok(CatalogItem {
        id: row.get(0)?,
        hash_name: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        rarity: row.get(4)?,
        item_type: row.get(5)?,
        stattrak_available: row.get(6)?,
        souvenir_available: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(hash_name: &str) -> CatalogSeed {
        CatalogSeed {
            hash_name: hash_name.to_string(),
            name: hash_name.to_string(),
            category: None,
            rarity: None,
            item_type: None,
            stattrak_available: false,
            souvenir_available: false,
        }
    }

    fn new_record(user: &UserId, asset_id: &str, catalog_item_id: i64) -> NewInventoryRecord {
        NewInventoryRecord {
            user_id: user.clone(),
            asset_id: asset_id.to_string(),
            catalog_item_id,
            float_value: Some(0.25),
            pattern: Some(7),
            stattrak_kills: None,
            stickers: Vec::new(),
            keychain: Some(Keychain {
                name: "Hot Howl".to_string(),
                pattern: None,
            }),
            name_tag: None,
            inspect_link: None,
            container_id: None,
            acquired_at: Utc::now(),
            acquisition_price: None,
        }
    }

    fn descriptor(external_id: &str, count: u32) -> ContainerDescriptor {
        ContainerDescriptor {
            external_id: external_id.to_string(),
            name: "Knives".to_string(),
            reported_count: count,
            modified_at: None,
        }
    }

    async fn store_with_item() -> (SqliteInventoryStore, i64) {
        let store = SqliteInventoryStore::open_in_memory().expect("open store");
        store.ensure_schema().await.expect("schema");
        store
            .upsert_items(&[seed("AK-47 | Redline (Field-Tested)")])
            .await
            .expect("seed catalog");
        let items = store
            .find_by_hash_names(&["AK-47 | Redline (Field-Tested)".to_string()])
            .await
            .expect("catalog");
        (store, items[0].id)
    }

    #[tokio::test]
    async fn upsert_refreshes_existing_hash_names() {
        let (store, id) = store_with_item().await;
        let mut renamed = seed("AK-47 | Redline (Field-Tested)");
        renamed.rarity = Some("Classified".to_string());
        store.upsert_items(&[renamed]).await.expect("upsert");
        let items = store
            .find_by_hash_names(&["AK-47 | Redline (Field-Tested)".to_string()])
            .await
            .expect("catalog");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].rarity.as_deref(), Some("Classified"));
    }

    #[tokio::test]
    async fn rejected_insert_leaves_the_rest_of_the_transaction_intact() {
        let (store, item_id) = store_with_item().await;
        let user = UserId("u1".to_string());

        let mut outcomes = Vec::new();
        store
            .in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
                outcomes.push(tx.insert_record(&new_record(&user, "A", item_id)).is_ok());
                outcomes.push(matches!(
                    tx.insert_record(&new_record(&user, "B", 9999)),
                    Err(StoreError::Rejected(_))
                ));
                outcomes.push(tx.insert_record(&new_record(&user, "C", item_id)).is_ok());
                Ok(())
            })
            .expect("transaction");
        assert_eq!(outcomes, vec![true, true, true]);

        let active = store.find_active_inventory(&user).await.expect("active");
        let ids: Vec<_> = active.iter().map(|r| r.asset_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(
            active[0].keychain.as_ref().map(|k| k.name.as_str()),
            Some("Hot Howl")
        );
        assert_eq!(active[0].hash_name, "AK-47 | Redline (Field-Tested)");
    }

    #[tokio::test]
    async fn failed_work_rolls_everything_back() {
        let (store, item_id) = store_with_item().await;
        let user = UserId("u1".to_string());
        let result = store.in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
            tx.sync_container(&user, &descriptor("900", 3))?;
            tx.insert_record(&new_record(&user, "A", item_id))?;
            Err(StoreError::Unavailable(anyhow!("disk went away")))
        });
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store
            .find_active_inventory(&user)
            .await
            .expect("active")
            .is_empty());
        assert!(store
            .list_containers(&user)
            .await
            .expect("containers")
            .is_empty());
    }

    #[tokio::test]
    async fn deletions_never_reach_contained_records() {
        let (store, item_id) = store_with_item().await;
        let user = UserId("u1".to_string());
        store
            .in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
                let container = tx.sync_container(&user, &descriptor("900", 1))?;
                let boxed = tx.insert_record(&new_record(&user, "BOXED", item_id))?;
                tx.insert_record(&new_record(&user, "LOOSE", item_id))?;
                tx.assign_container(&user, &[boxed], Some(container))?;
                Ok(())
            })
            .expect("seed");

        let mut deleted = 0;
        store
            .in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
                deleted =
                    tx.delete_active_records(&user, &["BOXED".to_string(), "LOOSE".to_string()])?;
                Ok(())
            })
            .expect("delete");
        assert_eq!(deleted, 1);

        let containers = store.list_containers(&user).await.expect("containers");
        let contents = store
            .find_container_contents(containers[0].id)
            .await
            .expect("contents");
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].asset_id, "BOXED");
    }

    #[tokio::test]
    async fn manual_containers_are_never_refreshed() {
        let (store, _) = store_with_item().await;
        let user = UserId("u1".to_string());
        let manual = store
            .create_manual_container(&user, "Trade stash")
            .await
            .expect("manual");

        let mut refreshed = true;
        store
            .in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
                refreshed = tx.refresh_container(manual.id, &descriptor("900", 12))?;
                tx.sync_container(&user, &descriptor("900", 12))?;
                Ok(())
            })
            .expect("sync");
        assert!(!refreshed);

        let stored = store
            .find_container(manual.id)
            .await
            .expect("find")
            .expect("manual");
        assert_eq!(stored.reported_count, None);
        assert_eq!(stored.name, "Trade stash");
        assert_eq!(store.list_containers(&user).await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn deleting_a_container_releases_its_contents() {
        let (store, item_id) = store_with_item().await;
        let user = UserId("u1".to_string());
        let manual = store
            .create_manual_container(&user, "Trade stash")
            .await
            .expect("manual");
        store
            .in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
                let id = tx.insert_record(&new_record(&user, "A", item_id))?;
                tx.assign_container(&user, &[id], Some(manual.id))?;
                Ok(())
            })
            .expect("seed");

        let released = store.delete_container(manual.id).await.expect("delete");
        assert_eq!(released, 1);
        assert_eq!(
            store
                .find_active_inventory(&user)
                .await
                .expect("active")
                .len(),
            1
        );
        assert!(store
            .find_container(manual.id)
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn asset_ids_are_unique_per_user() {
        let (store, item_id) = store_with_item().await;
        let user = UserId("u1".to_string());
        let other = UserId("u2".to_string());

        let mut outcomes = Vec::new();
        store
            .in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
                let first = tx.insert_record(&new_record(&user, "A", item_id))?;
                outcomes.push(matches!(
                    tx.insert_record(&new_record(&user, "A", item_id)),
                    Err(StoreError::Rejected(_))
                ));
                outcomes.push(tx.insert_record(&new_record(&other, "A", item_id)).is_ok());
                let second = tx.insert_record(&new_record(&user, "B", item_id))?;
                outcomes.push(first != second);
                Ok(())
            })
            .expect("transaction");
        assert_eq!(outcomes, vec![true, true, true]);
        assert_eq!(
            store
                .find_active_inventory(&user)
                .await
                .expect("active")
                .len(),
            2
        );

        let b = store
            .find_active_inventory(&user)
            .await
            .expect("active")
            .into_iter()
            .find(|r| r.asset_id == "B")
            .expect("record B");
        assert!(!store.update_asset_id(b.id, "A").await.expect("update"));
        assert!(store.update_asset_id(b.id, "B2").await.expect("update"));
    }
}
