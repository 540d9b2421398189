//! # Account Service
//!
//! User account management over REST: list, fetch, create, update and
//! delete accounts, plus self-service password change.
//!
//! ## Architecture
//!
//! - **domain**: the account entity, DTOs and the store contracts
//! - **application**: `AccountService` and its error vocabulary
//! - **infrastructure**: SQLite (SeaORM) and in-memory stores, bcrypt
//! - **interfaces**: axum routes, Swagger UI, health and metrics
//! - **server**: bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, CONFIG_ENV_VAR};

pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryAccountRepository, SeaOrmAccountRepository,
};

pub use interfaces::http::create_api_router;
