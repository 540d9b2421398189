//! Domain layer: the account aggregate and the store contracts it relies on.

pub mod account;

pub use account::{
    Account, AccountProfile, AccountRepository, AccountView, ChangePasswordDto, CreateAccountDto,
    CredentialStore, NewAccount, UpdateAccountDto,
};

pub use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
