use std::collections::HashMap;

use crate::entities::{CatalogItem, MatchedRecord, NormalizedRecord, UnmatchedRecord};

/// Resolves normalized records to catalog entries by exact hash name.
#[derive(Debug, Default)]
pub struct CatalogMatcher {
    by_hash_name: HashMap<String, CatalogItem>,
}

impl CatalogMatcher {
    /// When several entries share a hash name the first one given wins.
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut by_hash_name = HashMap::new();
        for item in items {
            by_hash_name.entry(item.hash_name.clone()).or_insert(item);
        }
        Self { by_hash_name }
    }

    pub fn resolve(&self, hash_name: &str) -> Option<&CatalogItem> {
        self.by_hash_name.get(hash_name)
    }

    pub fn partition(
        &self,
        records: Vec<NormalizedRecord>,
    ) -> (Vec<MatchedRecord>, Vec<UnmatchedRecord>) {
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();
        for record in records {
            match self.resolve(&record.hash_name) {
                Some(item) => matched.push(MatchedRecord {
                    catalog_item_id: item.id,
                    record,
                }),
                None => unmatched.push(UnmatchedRecord::from(&record)),
            }
        }
        (matched, unmatched)
    }
}
