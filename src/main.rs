//! Account service binary.
//!
//! Reads configuration from `$ACCOUNT_SERVICE_CONFIG` or
//! `~/.config/account-service/config.toml`, falling back to defaults.

use tracing::{error, info};

use account_service::config::{AppConfig, CONFIG_ENV_VAR};
use account_service::default_config_path;
use account_service::server::{init_tracing, ServerHandle, ServerOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var(CONFIG_ENV_VAR)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());

    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}. Using defaults.", config_path.display(), e);
            cfg
        }
    };

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: true,
    })
    .await?;

    handle.install_signal_handler();
    handle.wait().await;

    Ok(())
}
