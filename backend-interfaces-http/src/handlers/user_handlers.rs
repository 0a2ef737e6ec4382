use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::user_queries;
use backend_application::AppState;
use backend_domain::{Role, UserProfile};

use crate::error::HttpError;
use crate::middleware::{authenticate, require_role};

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserProfile>>, HttpError> {
    let user = authenticate(&state, &headers).await?;
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let users = user_queries::list_users(&state).await?;
    Ok(Json(users))
}
