use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use backend_domain::{Role, User};

use crate::dtos::{AuthResponse, LoginRequest, RegisterRequest, SeedAccount};
use crate::{AppError, AppState};

pub async fn register_user(
    state: &AppState,
    request: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::BadRequest("username must not be empty".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::BadRequest("password must not be empty".to_string()));
    }
    let role = match request.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|err| AppError::BadRequest(err.to_string()))?,
        None => Role::default(),
    };

    if find_user(state, &username).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username,
        password_hash: state.credentials.hash_password(&request.password)?,
        role,
        created_at: Utc::now(),
    };
    state.user_repo.save_user(&user).await?;
    info!(username = %user.username, role = user.role.as_str(), "registered user");
    auth_response(state, &user)
}

pub async fn login_user(state: &AppState, request: LoginRequest) -> Result<AuthResponse, AppError> {
    let username = request.username.trim();
    let Some(user) = find_user(state, username).await? else {
        warn!(username = %username, "login failed: unknown user");
        return Err(AppError::InvalidCredentials);
    };
    if !state
        .credentials
        .verify_password(&request.password, &user.password_hash)?
    {
        warn!(username = %username, "login failed: password mismatch");
        return Err(AppError::InvalidCredentials);
    }
    auth_response(state, &user)
}

/// Upserts the given accounts by username, keeping the id of accounts that
/// already exist so issued tokens stay valid.
pub async fn seed_users(state: &AppState, accounts: &[SeedAccount]) -> Result<usize, AppError> {
    for account in accounts {
        let existing = find_user(state, &account.username).await?;
        let user = User {
            id: existing
                .as_ref()
                .map(|user| user.id.clone())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            username: account.username.clone(),
            password_hash: state.credentials.hash_password(&account.password)?,
            role: account.role,
            created_at: existing.map(|user| user.created_at).unwrap_or_else(Utc::now),
        };
        state.user_repo.save_user(&user).await?;
        info!(username = %user.username, role = user.role.as_str(), "seeded user");
    }
    Ok(accounts.len())
}

async fn find_user(state: &AppState, username: &str) -> Result<Option<User>, AppError> {
    state
        .user_repo
        .find_user_by_username(username)
        .await
        .map_err(AppError::Internal)
}

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        role: user.role,
        token: state.credentials.issue_token(&user.id)?,
    })
}
