pub mod context;
pub mod lifecycle;
pub mod seed;

pub use context::AppContext;
pub use lifecycle::run_standalone;
pub use seed::{default_seed_accounts, run_seed_users};

pub async fn run() -> anyhow::Result<()> {
    let context = AppContext::new().await?;
    run_standalone(context).await
}
