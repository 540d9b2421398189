//! Account Service CLI
//!
//! Headless account service suitable for a systemd unit, a container or
//! a plain foreground process.
//!
//! ```sh
//! # Default config (~/.config/account-service/config.toml)
//! account-cli
//!
//! # Custom config path and port
//! account-cli --config /etc/account-service/config.toml --api-port 8080
//!
//! # Validate config without starting
//! account-cli --check
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info, warn};

use account_service::config::AppConfig;
use account_service::server::{init_tracing, ServerHandle, ServerOptions};
use account_service::shared::InfraError;

/// REST service for user accounts.
#[derive(Parser, Debug)]
#[command(
    name = "account-cli",
    version,
    about = "User account management service",
    long_about = "REST API for creating, updating and deleting user accounts \
                  with self-service password change.\n\n\
                  Default config: ~/.config/account-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "ACCOUNT_SERVICE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

/// A missing file falls back to defaults; a malformed one is fatal.
fn load_config(path: &Path) -> Result<(AppConfig, bool), InfraError> {
    match AppConfig::load(path) {
        Ok(cfg) => Ok((cfg, true)),
        Err(InfraError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok((AppConfig::default(), false))
        }
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(account_service::default_config_path);

    let (mut config, from_file) = match load_config(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Invalid config {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    if from_file {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!(
            "No config at {}, using defaults",
            config_path.display()
        );
    }
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }

    if cli.check {
        if let Err(e) = config.validate() {
            error!("Configuration is invalid: {}", e);
            return Err(e.into());
        }
        println!("Configuration is valid");
        println!("   Config file  : {}", config_path.display());
        println!("   API address  : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Store        : {:?}", config.database.backend);
        println!("   Database     : {}", config.database.connection_url());
        println!("   Email policy : {:?}", config.accounts.update_email_policy);
        println!("   Log level    : {}", config.logging.level);
        return Ok(());
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}
