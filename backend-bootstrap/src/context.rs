use std::sync::Arc;

use anyhow::Result;
use clickhouse::Client;
use tracing::info;

use backend_application::{AppState, Metrics};
use backend_domain::{AssetRepository, EventRepository, StorageBackend, UserRepository};
use backend_infrastructure::{AppConfig, ClickhouseRepo, JwtCredentialService, MemoryRepository};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let auth_config = config.to_auth_config();

        let (asset_repo, event_repo, user_repo): (
            Arc<dyn AssetRepository>,
            Arc<dyn EventRepository>,
            Arc<dyn UserRepository>,
        ) = match runtime_config.storage_backend {
            StorageBackend::Clickhouse => {
                let db_config = config.to_db_config();
                let mut clickhouse = Client::default()
                    .with_url(&db_config.clickhouse_url)
                    .with_database(&db_config.clickhouse_database);
                if let Some(user) = &db_config.clickhouse_user {
                    clickhouse = clickhouse.with_user(user);
                }
                if let Some(password) = &db_config.clickhouse_password {
                    clickhouse = clickhouse.with_password(password);
                }
                let repo = Arc::new(ClickhouseRepo::new(
                    clickhouse,
                    db_config.clickhouse_database.clone(),
                ));
                info!(
                    url = %db_config.clickhouse_url,
                    database = %db_config.clickhouse_database,
                    "using clickhouse storage"
                );
                (repo.clone(), repo.clone(), repo)
            }
            StorageBackend::Memory => {
                info!("using in-memory storage, data is lost on exit");
                let repo = Arc::new(MemoryRepository::new());
                (repo.clone(), repo.clone(), repo)
            }
        };
        event_repo.ensure_schema().await?;

        let state = AppState {
            config: runtime_config,
            asset_repo,
            event_repo,
            user_repo,
            credentials: Arc::new(JwtCredentialService::new(&auth_config)),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
