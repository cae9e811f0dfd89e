// Display pricing and trend arithmetic

use crate::entities::{EntryPricing, PriceQuote, PriceSample};

pub const TREND_WINDOW_24H_MS: i64 = 24 * 60 * 60 * 1000;
pub const TREND_WINDOW_7D_MS: i64 = 7 * TREND_WINDOW_24H_MS;

/// Value realizable on resale: the item plus its detachable charm.
pub fn tradeable_value(base_price: Option<f64>, keychain_price: Option<f64>) -> f64 {
    base_price.unwrap_or(0.0) + keychain_price.unwrap_or(0.0)
}

/// Builds the display breakdown. Sticker prices count toward the shown total only.
pub fn price_entry(
    quote: &PriceQuote,
    sticker_prices: impl IntoIterator<Item = Option<f64>>,
    keychain_price: Option<f64>,
) -> EntryPricing {
    let sticker_total: f64 = sticker_prices.into_iter().flatten().sum();
    let tradeable = tradeable_value(quote.price, keychain_price);
    EntryPricing {
        base_price: quote.price,
        median_price: quote.median_price,
        sticker_total,
        keychain_price,
        display_total: tradeable + sticker_total,
        tradeable_value: tradeable,
    }
}

/// Percentage change from `old` to `new`; `None` when either is missing or `old` is zero.
pub fn trend_percent(new: Option<f64>, old: Option<f64>) -> Option<f64> {
    let (new, old) = (new?, old?);
    if old == 0.0 {
        return None;
    }
    Some((new - old) / old * 100.0)
}

/// Sample nearest to `target_ms`, ignoring anything further than `tolerance_ms` away.
pub fn closest_sample(samples: &[PriceSample], target_ms: i64, tolerance_ms: i64) -> Option<&PriceSample> {
    samples
        .iter()
        .map(|sample| ((sample.sampled_at_ms - target_ms).abs(), sample))
        .filter(|(distance, _)| *distance <= tolerance_ms)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, sample)| sample)
}
