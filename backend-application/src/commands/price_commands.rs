use backend_domain::{PriceSample, PriceSamplesPayload};
use tracing::{error, info};

use crate::{AppError, AppState};

const MAX_SAMPLES_PER_BATCH: usize = 5000;

pub async fn ingest_price_samples(
    state: &AppState,
    payload: PriceSamplesPayload,
) -> Result<usize, AppError> {
    let samples = validate_samples(payload.samples)?;
    if samples.is_empty() {
        return Ok(0);
    }
    state
        .price_repo
        .insert_samples(&samples)
        .await
        .map_err(|err| {
            error!("failed to insert price samples: {}", err);
            AppError::Internal(err)
        })?;
    info!(count = samples.len(), "price samples ingested");
    Ok(samples.len())
}

fn validate_samples(samples: Vec<PriceSample>) -> Result<Vec<PriceSample>, AppError> {
    if samples.len() > MAX_SAMPLES_PER_BATCH {
        return Err(AppError::BadRequest(format!(
            "at most {} samples per batch",
            MAX_SAMPLES_PER_BATCH
        )));
    }
    samples
        .into_iter()
        .map(|mut sample| {
            sample.hash_name = sample.hash_name.trim().to_string();
            if sample.hash_name.is_empty() {
                return Err(AppError::BadRequest("hash_name is required".to_string()));
            }
            if !sample.price.is_finite() || sample.price < 0.0 {
                return Err(AppError::BadRequest(format!(
                    "invalid price for '{}'",
                    sample.hash_name
                )));
            }
            if sample.median_price.is_some_and(|m| !m.is_finite() || m < 0.0) {
                return Err(AppError::BadRequest(format!(
                    "invalid median_price for '{}'",
                    sample.hash_name
                )));
            }
            if sample.sampled_at_ms <= 0 {
                return Err(AppError::BadRequest(format!(
                    "sampled_at_ms must be > 0 for '{}'",
                    sample.hash_name
                )));
            }
            Ok(sample)
        })
        .collect()
}
