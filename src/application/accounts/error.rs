use thiserror::Error;

/// Business outcome of a failed account operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Password and password confirmation must match")]
    PasswordMismatch,

    #[error("Email already exist")]
    EmailTaken,

    #[error("Invalid current password")]
    InvalidCredentials,

    #[error("Unknown user")]
    NotFound,

    #[error("Failed to create user")]
    CreationFailed,

    #[error("Failed to update user")]
    UpdateFailed,

    #[error("Failed to delete user")]
    DeletionFailed,

    /// The store could not be reached. Not a business outcome.
    #[error("Account store is unavailable")]
    Unavailable,
}

impl AccountError {
    /// Stable label used for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::PasswordMismatch => "password_mismatch",
            Self::EmailTaken => "email_taken",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotFound => "not_found",
            Self::CreationFailed => "creation_failed",
            Self::UpdateFailed => "update_failed",
            Self::DeletionFailed => "deletion_failed",
            Self::Unavailable => "unavailable",
        }
    }
}

pub type AccountResult<T> = Result<T, AccountError>;
