pub mod asset_handlers;
pub mod auth_handlers;
pub mod dashboard_handlers;
pub mod ops_handlers;
pub mod sync_handlers;
pub mod user_handlers;

pub use asset_handlers::*;
pub use auth_handlers::*;
pub use dashboard_handlers::*;
pub use ops_handlers::*;
pub use sync_handlers::*;
pub use user_handlers::*;
