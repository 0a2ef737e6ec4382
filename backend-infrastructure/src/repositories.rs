pub mod clickhouse_repo;
pub mod memory_repo;

pub use clickhouse_repo::*;
pub use memory_repo::*;
