use std::sync::Arc;

use backend_domain::{AuthConfig, RuntimeConfig};
use backend_infrastructure::{JwtCredentialService, MemoryRepository};

use crate::{AppState, Metrics};

pub(crate) fn memory_state() -> AppState {
    let repo = Arc::new(MemoryRepository::new());
    let credentials = JwtCredentialService::new(&AuthConfig {
        jwt_secret: "test-secret".to_string(),
        token_ttl_days: 1,
    });
    AppState {
        config: RuntimeConfig::default(),
        asset_repo: repo.clone(),
        event_repo: repo.clone(),
        user_repo: repo,
        credentials: Arc::new(credentials),
        metrics: Arc::new(Metrics::default()),
    }
}
