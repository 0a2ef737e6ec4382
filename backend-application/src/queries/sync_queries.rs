use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::error;

use backend_domain::Asset;

use crate::{AppError, AppState};

/// Assets changed after `last_sync`. A missing or unparsable timestamp
/// returns every asset so the client performs a full pull.
pub async fn list_changed_since(
    state: &AppState,
    last_sync: Option<&str>,
) -> Result<Vec<Asset>, AppError> {
    let since = last_sync.and_then(parse_last_sync);
    state
        .asset_repo
        .list_assets_updated_since(since)
        .await
        .map_err(|err| {
            error!("failed to list changed assets: {}", err);
            AppError::Internal(err)
        })
}

pub fn parse_last_sync(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}
