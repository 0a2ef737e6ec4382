// Domain value objects
pub mod action_type;
pub mod asset_status;
pub mod gps_point;
pub mod role;

pub use action_type::*;
pub use asset_status::*;
pub use gps_point::*;
pub use role::*;
