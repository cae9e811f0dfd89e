use std::io::Read;

use anyhow::{bail, Result};
use axum::http::HeaderMap;
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use backend_domain::{RuntimeConfig, UserId};

use crate::error::HttpError;

pub const USER_ID_HEADER: &str = "X-User-Id";

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

/// The caller's user id, taken from the `X-User-Id` header.
pub fn resolve_user(headers: &HeaderMap) -> Option<UserId> {
    let value = headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(UserId(value.to_string()))
}

/// Checks the bearer token and resolves the user in one step.
pub fn authenticate(config: &RuntimeConfig, headers: &HeaderMap) -> Result<UserId, HttpError> {
    if !authorize(config, headers) {
        return Err(HttpError::Unauthorized);
    }
    resolve_user(headers)
        .ok_or_else(|| HttpError::BadRequest(format!("missing {} header", USER_ID_HEADER)))
}

/// Decodes a JSON body, gunzipping it first when sent with `Content-Encoding: gzip`.
/// The inflated body may not exceed `limit` bytes.
pub fn parse_json_body<T: DeserializeOwned>(
    headers: &HeaderMap,
    body: &[u8],
    limit: u64,
) -> Result<T> {
    let content = maybe_gunzip(headers, body, limit)?;
    Ok(serde_json::from_str(&content)?)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body).take(limit.saturating_add(1));
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            if out.len() as u64 > limit {
                bail!("decompressed body exceeds {} bytes", limit);
            }
            return Ok(String::from_utf8(out)?);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
