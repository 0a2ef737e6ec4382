pub mod asset_commands;
pub mod auth_commands;
pub mod sync_commands;
