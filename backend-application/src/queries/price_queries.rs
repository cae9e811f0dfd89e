use backend_domain::{
    closest_sample, current_millis, trend_percent, PriceTrend, PriceTrendQuery,
    TREND_WINDOW_24H_MS, TREND_WINDOW_7D_MS,
};
use tracing::error;

use crate::{AppError, AppState};

/// Latest and median price plus the 24h and 7d change, each measured against the
/// sample closest to the window start within the configured tolerance.
pub async fn price_trend(state: &AppState, query: PriceTrendQuery) -> Result<PriceTrend, AppError> {
    let hash_name = query.hash_name.trim().to_string();
    if hash_name.is_empty() {
        return Err(AppError::BadRequest("hash_name is required".to_string()));
    }

    let now = current_millis();
    let tolerance_ms = (state.config.trend_tolerance_minutes as i64).saturating_mul(60_000);

    let quotes = state
        .price_repo
        .latest_quotes(std::slice::from_ref(&hash_name))
        .await
        .map_err(|err| {
            error!("failed to load latest price: {}", err);
            AppError::Internal(err)
        })?;
    let quote = quotes.get(&hash_name).cloned().unwrap_or_default();

    let samples = state
        .price_repo
        .samples_between(&hash_name, now - TREND_WINDOW_7D_MS - tolerance_ms, now)
        .await
        .map_err(|err| {
            error!("failed to load price history: {}", err);
            AppError::Internal(err)
        })?;

    let past = |window_ms: i64| {
        closest_sample(&samples, now - window_ms, tolerance_ms).map(|sample| sample.price)
    };

    Ok(PriceTrend {
        change_24h: trend_percent(quote.price, past(TREND_WINDOW_24H_MS)),
        change_7d: trend_percent(quote.price, past(TREND_WINDOW_7D_MS)),
        latest: quote.price,
        median: quote.median_price,
        hash_name,
    })
}
