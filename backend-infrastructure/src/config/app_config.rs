use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, RuntimeConfig};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub database_path: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub catalog_path: Option<String>,
    pub staging_ttl_seconds: u64,
    pub trend_tolerance_minutes: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            api_token: None,
            database_path: "./stash.db".to_string(),
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "stash".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            catalog_path: None,
            staging_ttl_seconds: runtime.staging_ttl_seconds,
            trend_tolerance_minutes: runtime.trend_tolerance_minutes,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
        }
    }
}

impl AppConfig {
    /// Reads `STASH_CONFIG` (default `./config.toml`), then applies `STASH_*` overrides.
    pub async fn load(path_override: Option<&str>) -> Result<Self> {
        let path = match path_override {
            Some(path) => path.to_string(),
            None => env::var("STASH_CONFIG").unwrap_or_else(|_| "./config.toml".to_string()),
        };
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.clickhouse_user = non_blank(self.clickhouse_user.take());
        self.clickhouse_password = non_blank(self.clickhouse_password.take());
        self.catalog_path = non_blank(self.catalog_path.take());
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if self.database_path != ":memory:" {
            self.database_path = resolve_path(base, &self.database_path);
        }
        if let Some(catalog_path) = &self.catalog_path {
            self.catalog_path = Some(resolve_path(base, catalog_path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.database_path.trim().is_empty() {
            return Err(anyhow!("database_path must not be empty"));
        }
        if self.clickhouse_url.trim().is_empty() {
            return Err(anyhow!("clickhouse_url must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.staging_ttl_seconds == 0 {
            return Err(anyhow!("staging_ttl_seconds must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            staging_ttl_seconds: self.staging_ttl_seconds,
            trend_tolerance_minutes: self.trend_tolerance_minutes,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            database_path: self.database_path.clone(),
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("STASH_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("STASH_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("STASH_DATABASE_PATH") {
            self.database_path = value;
        }
        if let Ok(value) = env::var("STASH_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("STASH_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("STASH_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("STASH_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("STASH_CATALOG_PATH") {
            self.catalog_path = Some(value);
        }
        if let Ok(value) = env::var("STASH_STAGING_TTL_SECONDS") {
            self.staging_ttl_seconds = value.parse().unwrap_or(self.staging_ttl_seconds);
        }
        if let Ok(value) = env::var("STASH_TREND_TOLERANCE_MINUTES") {
            self.trend_tolerance_minutes = value.parse().unwrap_or(self.trend_tolerance_minutes);
        }
        if let Ok(value) = env::var("STASH_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("STASH_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_secrets_are_treated_as_unset() {
        let mut config = AppConfig {
            api_token: Some("  ".to_string()),
            clickhouse_password: Some(String::new()),
            catalog_path: Some("catalog.json".to_string()),
            ..AppConfig::default()
        };
        config.normalize();
        assert!(config.api_token.is_none());
        assert!(config.clickhouse_password.is_none());
        assert_eq!(config.catalog_path.as_deref(), Some("catalog.json"));
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let mut config = AppConfig {
            catalog_path: Some("catalog.json".to_string()),
            ..AppConfig::default()
        };
        config.resolve_paths(Some(Path::new("/etc/stash")));
        assert_eq!(config.database_path, "/etc/stash/./stash.db");
        assert_eq!(
            config.catalog_path.as_deref(),
            Some("/etc/stash/catalog.json")
        );
    }

    #[test]
    fn validation_rejects_bad_bind_addr() {
        let config = AppConfig {
            bind_addr: "not-an-addr".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }
}
