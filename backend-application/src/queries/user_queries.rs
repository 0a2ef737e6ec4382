use backend_domain::UserProfile;

use crate::{AppError, AppState};

pub async fn list_users(state: &AppState) -> Result<Vec<UserProfile>, AppError> {
    let mut users = state.user_repo.list_users().await?;
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(users
        .into_iter()
        .map(|user| UserProfile {
            created_at: Some(user.created_at),
            ..user.profile()
        })
        .collect())
}
