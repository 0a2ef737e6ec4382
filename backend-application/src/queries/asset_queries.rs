use std::collections::HashMap;

use tracing::error;

use backend_domain::{Asset, AssetFilter, AssetStatus, EventRecord};

use crate::dtos::{AssetListQuery, AssetPage, EventView};
use crate::{AppError, AppState};

pub async fn list_assets(state: &AppState, query: AssetListQuery) -> Result<AssetPage, AppError> {
    let page = parse_positive(query.page.as_deref()).unwrap_or(1);
    let limit = parse_positive(query.limit.as_deref())
        .unwrap_or(state.config.default_page_size)
        .clamp(1, state.config.max_page_size.max(1));
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<AssetStatus>()
                .map_err(|err| AppError::BadRequest(err.to_string()))?,
        ),
        None => None,
    };
    let filter = AssetFilter {
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        status,
    };

    let offset = (page - 1).saturating_mul(limit);
    let assets = state
        .asset_repo
        .search_assets(&filter, offset, limit)
        .await
        .map_err(|err| {
            error!("failed to search assets: {}", err);
            AppError::Internal(err)
        })?;
    let total = state
        .asset_repo
        .count_assets(&filter)
        .await
        .map_err(AppError::Internal)?;
    let pages = (total as usize).div_ceil(limit);

    Ok(AssetPage {
        assets,
        page,
        pages,
        total,
    })
}

pub async fn get_asset(state: &AppState, asset_id: &str) -> Result<Asset, AppError> {
    state
        .asset_repo
        .find_asset(asset_id.trim())
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))
}

pub async fn list_asset_events(state: &AppState, asset_id: &str) -> Result<Vec<EventView>, AppError> {
    let records = state
        .event_repo
        .list_events_for_asset(asset_id.trim())
        .await
        .map_err(|err| {
            error!("failed to list events for {}: {}", asset_id, err);
            AppError::Internal(err)
        })?;
    with_usernames(state, records).await
}

/// Resolves each record's user id to a username; unknown ids stay unresolved.
pub(crate) async fn with_usernames(
    state: &AppState,
    records: Vec<EventRecord>,
) -> Result<Vec<EventView>, AppError> {
    let mut names: HashMap<String, Option<String>> = HashMap::new();
    let mut views = Vec::with_capacity(records.len());
    for record in records {
        if !names.contains_key(&record.user_id) {
            let user = state
                .user_repo
                .find_user_by_id(&record.user_id)
                .await
                .map_err(AppError::Internal)?;
            names.insert(record.user_id.clone(), user.map(|u| u.username));
        }
        let username = names.get(&record.user_id).cloned().flatten();
        views.push(EventView { record, username });
    }
    Ok(views)
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
}
