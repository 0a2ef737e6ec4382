pub mod asset_queries;
pub mod dashboard_queries;
pub mod sync_queries;
pub mod user_queries;
