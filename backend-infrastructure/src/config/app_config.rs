use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{AuthConfig, DbConfig, RuntimeConfig, StorageBackend};

use super::validation::parse_storage_backend;

pub const CONFIG_PATH_ENV: &str = "ASSET_SYNC_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub storage_backend: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_ttl_days: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            storage_backend: "clickhouse".to_string(),
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "asset_sync".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            jwt_secret: None,
            token_ttl_days: 30,
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 15,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::from_toml(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn normalize(&mut self) {
        self.storage_backend = self.storage_backend.trim().to_lowercase();
        self.clickhouse_user = normalize_optional(self.clickhouse_user.take());
        self.clickhouse_password = normalize_optional(self.clickhouse_password.take());
        self.jwt_secret = normalize_optional(self.jwt_secret.take());
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        parse_storage_backend(&self.storage_backend)?;
        if self.jwt_secret.is_none() {
            return Err(anyhow!(
                "jwt_secret must be set (config file or ASSET_SYNC_JWT_SECRET)"
            ));
        }
        if self.token_ttl_days == 0 {
            return Err(anyhow!("token_ttl_days must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        if self.default_page_size == 0 || self.max_page_size < self.default_page_size {
            return Err(anyhow!(
                "page sizes must satisfy 0 < default_page_size <= max_page_size"
            ));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            storage_backend: parse_storage_backend(&self.storage_backend)
                .unwrap_or(StorageBackend::Clickhouse),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    pub fn to_auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone().unwrap_or_default(),
            token_ttl_days: self.token_ttl_days,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ASSET_SYNC_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("ASSET_SYNC_STORAGE_BACKEND") {
            self.storage_backend = value;
        }
        if let Ok(value) = env::var("ASSET_SYNC_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("ASSET_SYNC_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("ASSET_SYNC_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("ASSET_SYNC_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("ASSET_SYNC_JWT_SECRET") {
            self.jwt_secret = Some(value);
        }
        if let Ok(value) = env::var("ASSET_SYNC_TOKEN_TTL_DAYS") {
            self.token_ttl_days = value.parse().unwrap_or(self.token_ttl_days);
        }
        if let Ok(value) = env::var("ASSET_SYNC_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("ASSET_SYNC_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("ASSET_SYNC_DEFAULT_PAGE_SIZE") {
            self.default_page_size = value.parse().unwrap_or(self.default_page_size);
        }
        if let Ok(value) = env::var("ASSET_SYNC_MAX_PAGE_SIZE") {
            self.max_page_size = value.parse().unwrap_or(self.max_page_size);
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|item| !item.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let mut config = AppConfig::from_toml(
            r#"
bind_addr = "0.0.0.0:8080"
storage_backend = "Memory"
jwt_secret = "abc"
clickhouse_user = "   "
"#,
        )
        .expect("parse");
        config.normalize();
        config.validate().expect("valid");
        assert_eq!(config.clickhouse_user, None);
        assert_eq!(config.token_ttl_days, 30);
        let runtime = config.to_runtime_config();
        assert_eq!(runtime.storage_backend, StorageBackend::Memory);
        assert_eq!(runtime.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn rejects_missing_secret_and_unknown_backend() {
        let mut config = AppConfig::default();
        config.normalize();
        assert!(config.validate().is_err());

        config.jwt_secret = Some("abc".to_string());
        config.storage_backend = "mongodb".to_string();
        assert!(config.validate().is_err());

        config.storage_backend = "clickhouse".to_string();
        config.validate().expect("valid");
    }

    #[test]
    fn rejects_inverted_page_sizes() {
        let mut config = AppConfig {
            jwt_secret: Some("abc".to_string()),
            default_page_size: 50,
            max_page_size: 20,
            ..AppConfig::default()
        };
        config.normalize();
        assert!(config.validate().is_err());
    }
}
