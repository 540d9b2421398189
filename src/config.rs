//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/account-service/config.toml`).
//! Every field has a default, so a partial file is fine.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::application::{AccountServiceConfig, UpdateEmailPolicy};
use crate::infrastructure::crypto::password::{DEFAULT_COST, MIN_COST};
use crate::infrastructure::{DatabaseConfig, PoolConfig};
use crate::shared::InfraError;

/// Env var holding an alternative config path.
pub const CONFIG_ENV_VAR: &str = "ACCOUNT_SERVICE_CONFIG";

/// `~/.config/account-service/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("account-service").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub security: SecuritySection,
    pub accounts: AccountsSection,
    pub validation: ValidationSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    /// Process-local store; data is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: StoreBackend,
    /// SQLite file path, used when `url` is not set
    pub path: String,
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let pool = PoolConfig::default();
        Self {
            backend: StoreBackend::Sqlite,
            path: "./accounts.db".to_string(),
            url: None,
            max_connections: pool.max_connections,
            min_connections: pool.min_connections,
            connect_timeout_secs: pool.connect_timeout_secs,
            acquire_timeout_secs: pool.acquire_timeout_secs,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}?mode=rwc", self.path))
    }

    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.connection_url(),
            pool: PoolConfig {
                max_connections: self.max_connections,
                min_connections: self.min_connections,
                connect_timeout_secs: self.connect_timeout_secs,
                acquire_timeout_secs: self.acquire_timeout_secs,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub bcrypt_cost: u32,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountsSection {
    pub update_email_policy: UpdateEmailPolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    pub strict_passwords: bool,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        let config: Self = toml::from_str(raw).map_err(|e| InfraError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if !(MIN_COST..=31).contains(&self.security.bcrypt_cost) {
            return Err(InfraError::Config(format!(
                "security.bcrypt_cost must be between {} and 31, got {}",
                MIN_COST, self.security.bcrypt_cost
            )));
        }
        if self.database.max_connections == 0 {
            return Err(InfraError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(InfraError::Config(
                "database.min_connections exceeds max_connections".to_string(),
            ));
        }
        Ok(())
    }

    pub fn account_service_config(&self) -> AccountServiceConfig {
        AccountServiceConfig {
            bcrypt_cost: self.security.bcrypt_cost,
            update_email_policy: self.accounts.update_email_policy,
        }
    }
}
