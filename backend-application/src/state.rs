use std::sync::Arc;

use backend_domain::ports::{AssetRepository, CredentialService, EventRepository, UserRepository};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub asset_repo: Arc<dyn AssetRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub credentials: Arc<dyn CredentialService>,
    pub metrics: Arc<Metrics>,
}
