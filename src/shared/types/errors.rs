use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Store-level errors reported by repository implementations.
///
/// These never reach the transport layer directly; the account service
/// classifies them into business outcomes first.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(msg)) = e.sql_err() {
            return DomainError::Conflict(msg);
        }
        match e {
            DbErr::ConnectionAcquire(err) => DomainError::Unavailable(err.to_string()),
            DbErr::Conn(err) => DomainError::Unavailable(err.to_string()),
            other => {
                let msg = other.to_string();
                if msg.contains("UNIQUE") || msg.contains("duplicate") {
                    DomainError::Conflict(msg)
                } else {
                    DomainError::Storage(msg)
                }
            }
        }
    }
}

/// Bootstrap errors: configuration loading and validation.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
