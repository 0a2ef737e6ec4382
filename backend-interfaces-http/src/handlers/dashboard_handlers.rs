use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::dtos::DashboardStats;
use backend_application::queries::dashboard_queries;
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::authenticate;

pub async fn dashboard_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, HttpError> {
    authenticate(&state, &headers).await?;
    let stats = dashboard_queries::dashboard_stats(&state).await?;
    Ok(Json(stats))
}
