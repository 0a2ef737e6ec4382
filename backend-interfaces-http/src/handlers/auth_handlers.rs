use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::auth_commands;
use backend_application::dtos::{AuthResponse, LoginRequest, RegisterRequest};
use backend_application::AppState;
use backend_domain::UserProfile;

use crate::error::HttpError;
use crate::middleware::authenticate;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HttpError> {
    let response = auth_commands::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, HttpError> {
    let response = auth_commands::login_user(&state, payload).await?;
    Ok(Json(response))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, HttpError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(user.profile()))
}
