use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::{error, info};

use backend_application::commands::sync_commands;
use backend_application::dtos::{SyncAssetsQuery, SyncResponse};
use backend_application::queries::sync_queries;
use backend_application::AppState;
use backend_domain::Asset;

use crate::error::HttpError;
use crate::middleware::{authenticate, parse_sync_batch};

pub async fn sync_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<SyncResponse>, HttpError> {
    let user = authenticate(&state, &headers).await?;

    let events = parse_sync_batch(&headers, &body).map_err(|err| {
        error!("failed to parse sync body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let submitted = events.len();

    let results = sync_commands::ingest_events(&state, events).await;
    info!(
        user = %user.username,
        submitted,
        processed = results.processed,
        errors = results.errors,
        "sync batch handled"
    );
    Ok(Json(SyncResponse {
        message: "Sync complete".to_string(),
        results,
    }))
}

pub async fn sync_assets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SyncAssetsQuery>,
) -> Result<Json<Vec<Asset>>, HttpError> {
    authenticate(&state, &headers).await?;
    let assets = sync_queries::list_changed_since(&state, query.last_sync.as_deref()).await?;
    Ok(Json(assets))
}
