use anyhow::{anyhow, Result};

use backend_domain::StorageBackend;

pub fn parse_storage_backend(value: &str) -> Result<StorageBackend> {
    match value.trim().to_lowercase().as_str() {
        "clickhouse" => Ok(StorageBackend::Clickhouse),
        "memory" => Ok(StorageBackend::Memory),
        other => Err(anyhow!(
            "storage_backend must be 'clickhouse' or 'memory', got '{}'",
            other
        )),
    }
}
