use anyhow::Result;
use tracing::info;

use backend_application::commands::auth_commands;
use backend_application::dtos::SeedAccount;
use backend_domain::Role;

use crate::context::AppContext;

/// Demo accounts for a fresh deployment.
pub fn default_seed_accounts() -> Vec<SeedAccount> {
    [
        ("admin", "password123", Role::Admin),
        ("manager", "password123", Role::Manager),
        ("operator", "password123", Role::Operator),
        ("test", "test123", Role::Manager),
    ]
    .into_iter()
    .map(|(username, password, role)| SeedAccount {
        username: username.to_string(),
        password: password.to_string(),
        role,
    })
    .collect()
}

pub async fn run_seed_users(context: &AppContext) -> Result<usize> {
    let accounts = default_seed_accounts();
    let seeded = auth_commands::seed_users(&context.state, &accounts).await?;
    info!("seeded {} users", seeded);
    Ok(seeded)
}
