// Domain entities

pub mod asset;
pub mod config;
pub mod event;
pub mod user;

pub use asset::*;
pub use config::*;
pub use event::*;
pub use user::*;
