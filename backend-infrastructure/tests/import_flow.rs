// End-to-end preview/apply flows against an in-memory SQLite store

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Value};

use backend_application::commands::container_commands::{
    apply_transfer, create_container, move_records, preview_deposit, preview_withdraw,
};
use backend_application::commands::import_commands::{apply_import, preview_import};
use backend_application::queries::inventory_queries::inventory_value;
use backend_application::{AppError, AppState, Metrics};
use backend_domain::ports::{
    InventoryRepository, InventoryTransaction, PriceRepository, StoreError, TransactionWork,
};
use backend_domain::{
    ApplyRequest, ApplyResult, CatalogRepository, CatalogSeed, Container, ContainerDescriptor,
    ContainerNameRequest, ImportDiff, ImportPreview, ImportPreviewRequest, InventoryRecord,
    MatchedRecord, MoveRecordsRequest, NewInventoryRecord, NormalizedRecord, PriceQuote,
    PriceSample, RuntimeConfig, StagedDiff, TransferPreviewRequest, UserId,
};
use backend_infrastructure::{DefaultHealthService, MemorySessionStore, SqliteInventoryStore};

const REDLINE: &str = "AK-47 | Redline (Field-Tested)";
const ASIIMOV: &str = "AWP | Asiimov (Field-Tested)";
const HOWL: &str = "M4A4 | Howl (Minimal Wear)";

#[derive(Default)]
struct SnapshotBuilder {
    assets: Vec<Value>,
    descriptions: Vec<Value>,
    properties: Vec<Value>,
}

impl SnapshotBuilder {
    fn item(mut self, asset_id: &str, hash_name: &str, float_value: f64) -> Self {
        let classid = format!("c{}", asset_id);
        self.assets
            .push(json!({"assetid": asset_id, "classid": classid, "instanceid": "0"}));
        self.descriptions.push(json!({
            "classid": classid,
            "instanceid": "0",
            "name": hash_name,
            "market_hash_name": hash_name,
            "tags": [{"category": "Type", "internal_name": "CSGO_Type_Rifle"}]
        }));
        self.properties.push(json!({
            "assetid": asset_id,
            "asset_properties": [{"propertyid": 2, "float_value": float_value}]
        }));
        self
    }

    fn storage_unit(mut self, asset_id: &str, name: &str, count: u32) -> Self {
        let classid = format!("su{}", asset_id);
        self.assets
            .push(json!({"assetid": asset_id, "classid": classid, "instanceid": "0"}));
        self.descriptions.push(json!({
            "classid": classid,
            "instanceid": "0",
            "name": "Storage Unit",
            "market_hash_name": "Storage Unit",
            "tags": [{"category": "Type", "internal_name": "CSGO_Type_Tool"}],
            "descriptions": [
                {"name": "nametag", "value": format!("Name Tag: ''{}''", name)},
                {"name": "attr: items count", "value": format!("Number of Items: {}", count)}
            ]
        }));
        self
    }

    fn build(self) -> String {
        json!({
            "assets": self.assets,
            "descriptions": self.descriptions,
            "asset_properties": self.properties,
        })
        .to_string()
    }
}

struct FixedPrices {
    quotes: HashMap<String, PriceQuote>,
}

#[async_trait]
impl PriceRepository for FixedPrices {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn latest_quotes(
        &self,
        hash_names: &[String],
    ) -> anyhow::Result<HashMap<String, PriceQuote>> {
        Ok(hash_names
            .iter()
            .filter_map(|name| self.quotes.get(name).map(|q| (name.clone(), q.clone())))
            .collect())
    }

    async fn samples_between(&self, _: &str, _: i64, _: i64) -> anyhow::Result<Vec<PriceSample>> {
        Ok(Vec::new())
    }

    async fn insert_samples(&self, _: &[PriceSample]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Store wrapper whose transactions lose the database on the Nth insert.
struct FailingStore {
    inner: Arc<SqliteInventoryStore>,
    fail_at: usize,
}

struct FailingTx<'a> {
    inner: &'a mut dyn InventoryTransaction,
    inserts: usize,
    fail_at: usize,
}

impl InventoryTransaction for FailingTx<'_> {
    fn sync_container(
        &mut self,
        user: &UserId,
        descriptor: &ContainerDescriptor,
    ) -> Result<i64, StoreError> {
        self.inner.sync_container(user, descriptor)
    }

    fn refresh_container(
        &mut self,
        container_id: i64,
        descriptor: &ContainerDescriptor,
    ) -> Result<bool, StoreError> {
        self.inner.refresh_container(container_id, descriptor)
    }

    fn delete_active_records(
        &mut self,
        user: &UserId,
        asset_ids: &[String],
    ) -> Result<usize, StoreError> {
        self.inner.delete_active_records(user, asset_ids)
    }

    fn insert_record(&mut self, record: &NewInventoryRecord) -> Result<i64, StoreError> {
        self.inserts += 1;
        if self.inserts == self.fail_at {
            return Err(StoreError::Unavailable(anyhow!("database unavailable")));
        }
        self.inner.insert_record(record)
    }

    fn assign_container(
        &mut self,
        user: &UserId,
        record_ids: &[i64],
        container_id: Option<i64>,
    ) -> Result<usize, StoreError> {
        self.inner.assign_container(user, record_ids, container_id)
    }
}

#[async_trait]
impl InventoryRepository for FailingStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        self.inner.ensure_schema().await
    }

    async fn find_active_inventory(&self, user: &UserId) -> anyhow::Result<Vec<InventoryRecord>> {
        self.inner.find_active_inventory(user).await
    }

    async fn find_container_contents(
        &self,
        container_id: i64,
    ) -> anyhow::Result<Vec<InventoryRecord>> {
        self.inner.find_container_contents(container_id).await
    }

    async fn find_records(&self, ids: &[i64]) -> anyhow::Result<Vec<InventoryRecord>> {
        self.inner.find_records(ids).await
    }

    async fn find_container(&self, container_id: i64) -> anyhow::Result<Option<Container>> {
        self.inner.find_container(container_id).await
    }

    async fn list_containers(&self, user: &UserId) -> anyhow::Result<Vec<Container>> {
        self.inner.list_containers(user).await
    }

    async fn create_manual_container(
        &self,
        user: &UserId,
        name: &str,
    ) -> anyhow::Result<Container> {
        self.inner.create_manual_container(user, name).await
    }

    async fn rename_container(&self, container_id: i64, name: &str) -> anyhow::Result<()> {
        self.inner.rename_container(container_id, name).await
    }

    async fn delete_container(&self, container_id: i64) -> anyhow::Result<usize> {
        self.inner.delete_container(container_id).await
    }

    async fn update_asset_id(&self, record_id: i64, asset_id: &str) -> anyhow::Result<bool> {
        self.inner.update_asset_id(record_id, asset_id).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.inner.ping().await
    }

    fn in_transaction(&self, work: &mut TransactionWork<'_>) -> Result<(), StoreError> {
        let fail_at = self.fail_at;
        self.inner
            .in_transaction(&mut |tx: &mut dyn InventoryTransaction| {
                let mut failing = FailingTx {
                    inner: tx,
                    inserts: 0,
                    fail_at,
                };
                work(&mut failing)
            })
    }
}

struct Harness {
    store: Arc<SqliteInventoryStore>,
    sessions: Arc<MemorySessionStore>,
    state: AppState,
    user: UserId,
}

impl Harness {
    async fn new() -> Self {
        let store = Arc::new(SqliteInventoryStore::open_in_memory().expect("open store"));
        store.ensure_schema().await.expect("schema");
        let seeds: Vec<CatalogSeed> = [REDLINE, ASIIMOV, HOWL]
            .iter()
            .map(|hash_name| CatalogSeed {
                hash_name: hash_name.to_string(),
                name: hash_name.to_string(),
                category: None,
                rarity: None,
                item_type: None,
                stattrak_available: true,
                souvenir_available: false,
            })
            .collect();
        store.upsert_items(&seeds).await.expect("seed catalog");

        let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(600)));
        let state = build_state(store.clone(), store.clone(), sessions.clone());
        Self {
            store,
            sessions,
            state,
            user: UserId("76561198000000001".to_string()),
        }
    }

    /// Same store and sessions, but transactions fail on the Nth insert.
    fn failing_state(&self, fail_at: usize) -> AppState {
        let failing = Arc::new(FailingStore {
            inner: self.store.clone(),
            fail_at,
        });
        build_state(failing, self.store.clone(), self.sessions.clone())
    }

    async fn preview(&self, tradeable: String) -> ImportPreview {
        preview_import(
            &self.state,
            &self.user,
            ImportPreviewRequest {
                tradeable,
                trade_locked: String::new(),
            },
        )
        .await
        .expect("preview")
    }

    async fn import_all(&self, tradeable: String) -> ApplyResult {
        let preview = self.preview(tradeable).await;
        apply_import(&self.state, &self.user, select_all(&preview)).await
    }

    async fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .store
            .find_active_inventory(&self.user)
            .await
            .expect("active")
            .into_iter()
            .map(|record| record.asset_id)
            .collect();
        ids.sort();
        ids
    }

    async fn marketplace_container(&self, external_id: &str) -> Container {
        self.store
            .list_containers(&self.user)
            .await
            .expect("containers")
            .into_iter()
            .find(|c| c.external_id.as_deref() == Some(external_id))
            .expect("marketplace container")
    }
}

fn build_state(
    inventory: Arc<dyn InventoryRepository>,
    catalog: Arc<SqliteInventoryStore>,
    sessions: Arc<MemorySessionStore>,
) -> AppState {
    let quotes = HashMap::from([
        (
            REDLINE.to_string(),
            PriceQuote {
                price: Some(5.0),
                median_price: Some(4.8),
            },
        ),
        (
            ASIIMOV.to_string(),
            PriceQuote {
                price: Some(40.0),
                median_price: None,
            },
        ),
    ]);
    let prices: Arc<dyn PriceRepository> = Arc::new(FixedPrices { quotes });
    AppState {
        config: RuntimeConfig::default(),
        health: Arc::new(DefaultHealthService::new(inventory.clone(), prices.clone())),
        inventory_repo: inventory,
        catalog_repo: catalog,
        price_repo: prices,
        session_store: sessions,
        metrics: Arc::new(Metrics::default()),
    }
}

fn select_all(preview: &ImportPreview) -> ApplyRequest {
    ApplyRequest {
        token: preview.token.to_string(),
        selected: preview
            .to_add
            .iter()
            .chain(preview.to_remove.iter())
            .map(|entry| entry.key.clone())
            .collect(),
    }
}

fn asset_ids(entries: &[backend_domain::DiffEntry]) -> Vec<&str> {
    let mut ids: Vec<&str> = entries.iter().map(|e| e.asset_id.as_str()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn reimporting_the_same_snapshot_is_a_no_op() {
    let harness = Harness::new().await;
    let snapshot = SnapshotBuilder::default()
        .item("A", REDLINE, 0.25)
        .item("B", ASIIMOV, 0.31)
        .build();

    let first = harness.import_all(snapshot.clone()).await;
    assert_eq!(first.added, 2);
    assert!(first.errors.is_empty());

    let second = harness.preview(snapshot).await;
    assert!(second.to_add.is_empty());
    assert!(second.to_remove.is_empty());
}

#[tokio::test]
async fn contained_records_are_never_proposed_for_removal() {
    let harness = Harness::new().await;
    harness
        .import_all(
            SnapshotBuilder::default()
                .item("A", REDLINE, 0.25)
                .item("B", ASIIMOV, 0.31)
                .item("C", HOWL, 0.07)
                .build(),
        )
        .await;

    let stash = create_container(
        &harness.state,
        &harness.user,
        ContainerNameRequest {
            name: "Trade stash".to_string(),
        },
    )
    .await
    .expect("container");
    let c_id = harness
        .store
        .find_active_inventory(&harness.user)
        .await
        .expect("active")
        .into_iter()
        .find(|r| r.asset_id == "C")
        .expect("record C")
        .id;
    let moved = move_records(
        &harness.state,
        &harness.user,
        MoveRecordsRequest {
            record_ids: vec![c_id],
            container_id: Some(stash.id),
        },
    )
    .await
    .expect("move");
    assert_eq!(moved.moved, 1);

    let preview = harness
        .preview(SnapshotBuilder::default().item("A", REDLINE, 0.25).build())
        .await;
    assert_eq!(asset_ids(&preview.to_remove), vec!["B"]);
    assert!(preview.to_add.is_empty());

    let result = apply_import(&harness.state, &harness.user, select_all(&preview)).await;
    assert_eq!(result.removed, 1);
    assert_eq!(harness.active_ids().await, vec!["A"]);
    let contents = harness
        .store
        .find_container_contents(stash.id)
        .await
        .expect("contents");
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].asset_id, "C");
}

#[tokio::test]
async fn import_syncs_marketplace_containers_and_leaves_manual_ones_alone() {
    let harness = Harness::new().await;
    let manual = create_container(
        &harness.state,
        &harness.user,
        ContainerNameRequest {
            name: "Trade stash".to_string(),
        },
    )
    .await
    .expect("container");

    let result = harness
        .import_all(
            SnapshotBuilder::default()
                .item("A", REDLINE, 0.25)
                .storage_unit("900", "Knives", 3)
                .build(),
        )
        .await;
    assert_eq!(result.added, 1);

    let knives = harness.marketplace_container("900").await;
    assert_eq!(knives.name, "Knives");
    assert_eq!(knives.reported_count, Some(3));

    let untouched = harness
        .store
        .find_container(manual.id)
        .await
        .expect("find")
        .expect("manual container");
    assert_eq!(untouched.reported_count, None);
    assert_eq!(untouched.name, "Trade stash");

    // A second import refreshes the same container instead of creating another.
    harness
        .import_all(
            SnapshotBuilder::default()
                .item("A", REDLINE, 0.25)
                .storage_unit("900", "Blades", 5)
                .build(),
        )
        .await;
    let containers = harness
        .store
        .list_containers(&harness.user)
        .await
        .expect("list");
    assert_eq!(containers.len(), 2);
    let knives = harness.marketplace_container("900").await;
    assert_eq!(knives.name, "Blades");
    assert_eq!(knives.reported_count, Some(5));
}

#[tokio::test]
async fn deposit_then_withdraw_heals_a_drifted_asset_id() {
    let harness = Harness::new().await;
    harness
        .import_all(
            SnapshotBuilder::default()
                .item("A", REDLINE, 0.25)
                .item("B", ASIIMOV, 0.31)
                .storage_unit("900", "Knives", 0)
                .build(),
        )
        .await;
    let knives = harness.marketplace_container("900").await;

    // A left the visible inventory: it went into the storage unit.
    let deposit = preview_deposit(
        &harness.state,
        &harness.user,
        knives.id,
        TransferPreviewRequest {
            snapshot: SnapshotBuilder::default()
                .item("B", ASIIMOV, 0.31)
                .storage_unit("900", "Knives", 1)
                .build(),
        },
    )
    .await
    .expect("deposit preview");
    assert_eq!(asset_ids(&deposit.entries), vec!["A"]);
    assert_eq!(deposit.entries[0].key, "deposit-A");

    let result = apply_transfer(
        &harness.state,
        &harness.user,
        ApplyRequest {
            token: deposit.token.to_string(),
            selected: vec!["deposit-A".to_string()],
        },
    )
    .await;
    assert_eq!(result.moved, 1);
    assert_eq!(
        harness.marketplace_container("900").await.reported_count,
        Some(1)
    );
    assert_eq!(harness.active_ids().await, vec!["B"]);

    // It comes back out under a new asset id.
    let withdraw = preview_withdraw(
        &harness.state,
        &harness.user,
        knives.id,
        TransferPreviewRequest {
            snapshot: SnapshotBuilder::default()
                .item("B", ASIIMOV, 0.31)
                .item("A2", REDLINE, 0.250_000_4)
                .storage_unit("900", "Knives", 0)
                .build(),
        },
    )
    .await
    .expect("withdraw preview");
    assert_eq!(withdraw.healed, 1);
    assert_eq!(asset_ids(&withdraw.entries), vec!["A2"]);

    let contents = harness
        .store
        .find_container_contents(knives.id)
        .await
        .expect("contents");
    assert_eq!(contents[0].asset_id, "A2");

    let result = apply_transfer(
        &harness.state,
        &harness.user,
        ApplyRequest {
            token: withdraw.token.to_string(),
            selected: vec!["withdraw-A2".to_string()],
        },
    )
    .await;
    assert_eq!(result.moved, 1);
    assert_eq!(harness.active_ids().await, vec!["A2", "B"]);
    assert_eq!(
        harness.marketplace_container("900").await.reported_count,
        Some(0)
    );
}

#[tokio::test]
async fn hard_failure_mid_apply_rolls_back_and_keeps_the_staged_diff() {
    let harness = Harness::new().await;
    harness
        .import_all(SnapshotBuilder::default().item("B", ASIIMOV, 0.31).build())
        .await;

    let preview = harness
        .preview(
            SnapshotBuilder::default()
                .item("A", REDLINE, 0.25)
                .item("C", HOWL, 0.07)
                .build(),
        )
        .await;
    assert_eq!(preview.to_add.len(), 2);
    assert_eq!(asset_ids(&preview.to_remove), vec!["B"]);

    let failing = harness.failing_state(2);
    let failed = apply_import(&failing, &harness.user, select_all(&preview)).await;
    assert_eq!(failed.added, 0);
    assert_eq!(failed.removed, 0);
    assert_eq!(failed.errors.len(), 1);
    assert!(failed.errors[0].starts_with("apply rolled back"));
    assert_eq!(harness.active_ids().await, vec!["B"]);

    // The staged diff survived the failure and can be retried.
    let retried = apply_import(&harness.state, &harness.user, select_all(&preview)).await;
    assert_eq!(retried.added, 2);
    assert_eq!(retried.removed, 1);
    assert_eq!(harness.active_ids().await, vec!["A", "C"]);
}

#[tokio::test]
async fn applying_two_previews_of_one_snapshot_adds_each_item_once() {
    let harness = Harness::new().await;
    let snapshot = SnapshotBuilder::default().item("A", REDLINE, 0.25).build();
    let first = harness.preview(snapshot.clone()).await;
    let second = harness.preview(snapshot).await;
    assert_eq!(asset_ids(&first.to_add), vec!["A"]);
    assert_eq!(asset_ids(&second.to_add), vec!["A"]);

    let applied = apply_import(&harness.state, &harness.user, select_all(&first)).await;
    assert_eq!(applied.added, 1);

    let again = apply_import(&harness.state, &harness.user, select_all(&second)).await;
    assert_eq!(again.added, 0);
    assert_eq!(again.skipped, 1);
    assert_eq!(harness.active_ids().await, vec!["A"]);

    let value = inventory_value(&harness.state, &harness.user)
        .await
        .expect("value");
    assert_eq!(value.active_value, 5.0);
}

#[tokio::test]
async fn keys_outside_the_staged_diff_are_ignored() {
    let harness = Harness::new().await;
    harness
        .import_all(
            SnapshotBuilder::default()
                .item("A", REDLINE, 0.25)
                .item("B", ASIIMOV, 0.31)
                .build(),
        )
        .await;

    let preview = harness
        .preview(SnapshotBuilder::default().item("A", REDLINE, 0.25).build())
        .await;
    let result = apply_import(
        &harness.state,
        &harness.user,
        ApplyRequest {
            token: preview.token.to_string(),
            selected: vec![
                "remove-B".to_string(),
                "remove-ZZZ".to_string(),
                "add-QQ".to_string(),
                "nonsense".to_string(),
            ],
        },
    )
    .await;
    assert_eq!(result.removed, 1);
    assert_eq!(result.added, 0);
    assert_eq!(result.skipped, 0);
    assert!(result.errors.is_empty());
    assert_eq!(harness.active_ids().await, vec!["A"]);
}

#[tokio::test]
async fn rejected_records_are_skipped_without_aborting_the_rest() {
    let harness = Harness::new().await;
    let catalog = harness
        .store
        .find_by_hash_names(&[REDLINE.to_string()])
        .await
        .expect("catalog");

    let record = |asset_id: &str| NormalizedRecord {
        asset_id: asset_id.to_string(),
        class_id: "1".to_string(),
        instance_id: "0".to_string(),
        name: REDLINE.to_string(),
        hash_name: REDLINE.to_string(),
        float_value: Some(0.25),
        pattern: None,
        inspect_link: None,
        stattrak: false,
        souvenir: false,
        stattrak_kills: None,
        stickers: Vec::new(),
        keychain: None,
        name_tag: None,
    };
    let staged = StagedDiff::Import(ImportDiff {
        user_id: harness.user.clone(),
        items_to_add: vec![
            MatchedRecord {
                catalog_item_id: 9_999,
                record: record("BAD"),
            },
            MatchedRecord {
                catalog_item_id: catalog[0].id,
                record: record("GOOD"),
            },
        ],
        items_to_remove: Vec::new(),
        containers: Vec::new(),
        created_at_ms: 0,
    });
    let token = harness.state.staging().store(&staged).await.expect("stage");

    let result = apply_import(
        &harness.state,
        &harness.user,
        ApplyRequest {
            token: token.to_string(),
            selected: vec!["add-BAD".to_string(), "add-GOOD".to_string()],
        },
    )
    .await;
    assert_eq!(result.added, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("BAD"));
    assert_eq!(harness.active_ids().await, vec!["GOOD"]);
}

#[tokio::test]
async fn unknown_and_foreign_tokens_fail_softly() {
    let harness = Harness::new().await;
    let result = apply_import(
        &harness.state,
        &harness.user,
        ApplyRequest {
            token: "import_missing".to_string(),
            selected: vec!["add-A".to_string()],
        },
    )
    .await;
    assert_eq!(
        result.errors,
        vec!["staged diff not found or expired".to_string()]
    );

    let preview = harness
        .preview(SnapshotBuilder::default().item("A", REDLINE, 0.25).build())
        .await;
    let intruder = UserId("76561198000000002".to_string());
    let stolen = apply_import(&harness.state, &intruder, select_all(&preview)).await;
    assert_eq!(stolen.added, 0);
    assert_eq!(stolen.errors.len(), 1);
    assert!(harness.active_ids().await.is_empty());

    // A transfer token cannot confirm an import and vice versa.
    let wrong_kind = apply_transfer(&harness.state, &harness.user, select_all(&preview)).await;
    assert_eq!(wrong_kind.moved, 0);
    assert_eq!(wrong_kind.errors.len(), 1);
}

#[tokio::test]
async fn malformed_snapshots_are_rejected_before_any_work() {
    let harness = Harness::new().await;
    let result = preview_import(
        &harness.state,
        &harness.user,
        ImportPreviewRequest {
            tradeable: SnapshotBuilder::default().item("A", REDLINE, 0.25).build(),
            trade_locked: "{\"assets\": [".to_string(),
        },
    )
    .await;
    match result {
        Err(AppError::BadRequest(message)) => assert!(message.contains("trade_locked")),
        other => panic!("expected bad request, got {:?}", other.map(|p| p.token)),
    }
}

#[tokio::test]
async fn unmatched_items_are_reported_and_never_staged() {
    let harness = Harness::new().await;
    let preview = harness
        .preview(
            SnapshotBuilder::default()
                .item("A", REDLINE, 0.25)
                .item("X", "Sticker | Unknown Thing", 0.0)
                .build(),
        )
        .await;
    assert_eq!(asset_ids(&preview.to_add), vec!["A"]);
    assert_eq!(preview.unmatched.len(), 1);
    assert_eq!(preview.unmatched[0].asset_id, "X");
    assert!((preview.add_value - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn inventory_value_splits_active_and_contained_records() {
    let harness = Harness::new().await;
    harness
        .import_all(
            SnapshotBuilder::default()
                .item("A", REDLINE, 0.25)
                .item("B", ASIIMOV, 0.31)
                .item("C", HOWL, 0.07)
                .build(),
        )
        .await;
    let stash = create_container(
        &harness.state,
        &harness.user,
        ContainerNameRequest {
            name: "Trade stash".to_string(),
        },
    )
    .await
    .expect("container");
    let b_id = harness
        .store
        .find_active_inventory(&harness.user)
        .await
        .expect("active")
        .into_iter()
        .find(|r| r.asset_id == "B")
        .expect("record B")
        .id;
    move_records(
        &harness.state,
        &harness.user,
        MoveRecordsRequest {
            record_ids: vec![b_id],
            container_id: Some(stash.id),
        },
    )
    .await
    .expect("move");

    let value = inventory_value(&harness.state, &harness.user)
        .await
        .expect("value");
    assert_eq!(value.active_count, 2);
    // Howl has no quote and contributes nothing.
    assert!((value.active_value - 5.0).abs() < 1e-9);
    assert_eq!(value.containers.len(), 1);
    assert!((value.containers[0].value - 40.0).abs() < 1e-9);
    assert_eq!(value.containers[0].actual_count, 1);
    assert!(value.containers[0].in_sync);
    assert!((value.total_value - 45.0).abs() < 1e-9);
}
