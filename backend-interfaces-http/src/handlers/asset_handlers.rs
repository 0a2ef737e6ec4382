use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::asset_commands;
use backend_application::dtos::{AssetListQuery, AssetPage, CreateAssetRequest, EventView};
use backend_application::queries::asset_queries;
use backend_application::AppState;
use backend_domain::Asset;

use crate::error::HttpError;
use crate::middleware::authenticate;

pub async fn list_assets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AssetListQuery>,
) -> Result<Json<AssetPage>, HttpError> {
    authenticate(&state, &headers).await?;
    let page = asset_queries::list_assets(&state, query).await?;
    Ok(Json(page))
}

pub async fn get_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(asset_id): Path<String>,
) -> Result<Json<Asset>, HttpError> {
    authenticate(&state, &headers).await?;
    let asset = asset_queries::get_asset(&state, &asset_id).await?;
    Ok(Json(asset))
}

pub async fn create_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<Asset>), HttpError> {
    let user = authenticate(&state, &headers).await?;
    let asset = asset_commands::create_asset(&state, &user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

pub async fn list_asset_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(asset_id): Path<String>,
) -> Result<Json<Vec<EventView>>, HttpError> {
    authenticate(&state, &headers).await?;
    let events = asset_queries::list_asset_events(&state, &asset_id).await?;
    Ok(Json(events))
}
