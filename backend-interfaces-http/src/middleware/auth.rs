use std::io::Read;

use anyhow::{anyhow, Result};
use axum::http::HeaderMap;
use flate2::read::GzDecoder;
use tracing::{error, warn};

use backend_application::AppState;
use backend_domain::{Role, User};

use crate::error::HttpError;

/// Resolves the bearer token to a stored user. Tokens for deleted users are rejected.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, HttpError> {
    let token = extract_bearer(headers)
        .ok_or_else(|| HttpError::Unauthorized("Not authorized, no token".to_string()))?;
    let user_id = state
        .credentials
        .verify_token(&token)
        .ok_or_else(|| HttpError::Unauthorized("Not authorized, token failed".to_string()))?;
    let user = state
        .user_repo
        .find_user_by_id(&user_id)
        .await
        .map_err(|err| {
            error!("failed to load user {}: {}", user_id, err);
            HttpError::Internal(err.to_string())
        })?;
    user.ok_or_else(|| {
        warn!("token subject {} no longer exists", user_id);
        HttpError::Unauthorized("Not authorized, token failed".to_string())
    })
}

pub fn require_role(user: &User, roles: &[Role]) -> Result<(), HttpError> {
    if user.has_any_role(roles) {
        Ok(())
    } else {
        Err(HttpError::Forbidden)
    }
}

/// Decodes `{ "events": [...] }`, optionally gzip-compressed. Elements are
/// returned untouched for per-event validation.
pub fn parse_sync_batch(headers: &HeaderMap, body: &[u8]) -> Result<Vec<serde_json::Value>> {
    let content = maybe_gunzip(headers, body)?;
    let mut envelope: serde_json::Value = serde_json::from_str(&content)?;
    match envelope.get_mut("events").map(serde_json::Value::take) {
        Some(serde_json::Value::Array(events)) => Ok(events),
        Some(_) => Err(anyhow!("events must be an array")),
        None => Err(anyhow!("events is required")),
    }
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
