//! Application layer: account use-cases.

pub mod accounts;

pub use accounts::{
    AccountError, AccountResult, AccountService, AccountServiceConfig, CreatedAccount,
    UpdateEmailPolicy,
};
