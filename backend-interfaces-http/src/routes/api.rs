use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    asset_handlers, auth_handlers, dashboard_handlers, ops_handlers, sync_handlers, user_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops_handlers::root_banner))
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/me", get(auth_handlers::me))
        .route("/api/sync/events", post(sync_handlers::sync_events))
        .route("/api/sync/assets", get(sync_handlers::sync_assets))
        .route(
            "/api/assets",
            get(asset_handlers::list_assets).post(asset_handlers::create_asset),
        )
        .route("/api/assets/:id", get(asset_handlers::get_asset))
        .route("/api/assets/:id/events", get(asset_handlers::list_asset_events))
        .route("/api/dashboard/stats", get(dashboard_handlers::dashboard_stats))
        .route("/api/users", get(user_handlers::list_users))
        .route("/api/health/live", get(ops_handlers::health_live))
        .route("/api/health/ready", get(ops_handlers::health_ready))
        .route("/api/metrics/prometheus", get(ops_handlers::metrics_prometheus))
        .with_state(state)
}
