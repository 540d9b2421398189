//! Account management
//!
//! `AccountService` owns every rule about accounts: email uniqueness,
//! confirmation matching and credential re-verification. Failures come back
//! as an [`AccountError`] so the transport only has to pick a status code.

pub mod error;
pub mod service;

pub use error::{AccountError, AccountResult};
pub use service::{AccountService, AccountServiceConfig, CreatedAccount, UpdateEmailPolicy};
