// Price enrichment for display payloads
// Read-only: a price store failure degrades to unpriced entries

use std::collections::{BTreeSet, HashMap};

use backend_domain::{
    price_entry, DiffEntry, EntryPricing, InventoryRecord, Keychain, PriceQuote, Sticker,
};
use tracing::warn;

use crate::AppState;

/// Every hash name whose price contributes to an entry: the item, its stickers and its charm.
pub fn priced_hash_names(hash_name: &str, stickers: &[Sticker], keychain: Option<&Keychain>) -> Vec<String> {
    let mut names = Vec::with_capacity(stickers.len() + 2);
    names.push(hash_name.to_string());
    names.extend(stickers.iter().map(Sticker::hash_name));
    names.extend(keychain.map(Keychain::hash_name));
    names
}

pub async fn load_quotes(
    state: &AppState,
    hash_names: impl IntoIterator<Item = String>,
) -> HashMap<String, PriceQuote> {
    let unique: BTreeSet<String> = hash_names.into_iter().collect();
    if unique.is_empty() {
        return HashMap::new();
    }
    let names: Vec<String> = unique.into_iter().collect();
    match state.price_repo.latest_quotes(&names).await {
        Ok(quotes) => quotes,
        Err(err) => {
            warn!("price lookup failed, continuing without prices: {}", err);
            HashMap::new()
        }
    }
}

pub fn pricing_for(
    hash_name: &str,
    stickers: &[Sticker],
    keychain: Option<&Keychain>,
    quotes: &HashMap<String, PriceQuote>,
) -> EntryPricing {
    let quote = quotes.get(hash_name).cloned().unwrap_or_default();
    let sticker_prices = stickers
        .iter()
        .map(|sticker| quotes.get(&sticker.hash_name()).and_then(|q| q.price));
    let keychain_price = keychain
        .and_then(|keychain| quotes.get(&keychain.hash_name()))
        .and_then(|q| q.price);
    price_entry(&quote, sticker_prices, keychain_price)
}

/// Attaches prices to diff entries and returns their summed tradeable value.
pub async fn enrich_entries(state: &AppState, entries: &mut [DiffEntry]) -> f64 {
    let names = entries
        .iter()
        .flat_map(|e| priced_hash_names(&e.hash_name, &e.stickers, e.keychain.as_ref()))
        .collect::<Vec<_>>();
    let quotes = load_quotes(state, names).await;
    price_loaded_entries(entries, &quotes)
}

pub fn price_loaded_entries(entries: &mut [DiffEntry], quotes: &HashMap<String, PriceQuote>) -> f64 {
    let mut total = 0.0;
    for entry in entries.iter_mut() {
        entry.pricing = pricing_for(&entry.hash_name, &entry.stickers, entry.keychain.as_ref(), quotes);
        total += entry.pricing.tradeable_value;
    }
    total
}

pub fn record_value(record: &InventoryRecord, quotes: &HashMap<String, PriceQuote>) -> f64 {
    pricing_for(&record.hash_name, &record.stickers, record.keychain.as_ref(), quotes).tradeable_value
}
