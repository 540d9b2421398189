use async_trait::async_trait;

use super::Account;
use crate::domain::DomainResult;

/// Row to insert; identity and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub name: String,
    pub email: String,
}

/// Lookup of accounts by their login email.
///
/// Pure data access: absence is `Ok(None)`, never an error.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>>;

    async fn email_exists(&self, email: &str) -> DomainResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}

/// Persistent account store.
///
/// Implementations must enforce email uniqueness themselves and report a
/// violation as `DomainError::Conflict`.
#[async_trait]
pub trait AccountRepository: CredentialStore {
    /// All accounts, oldest first.
    async fn list_accounts(&self) -> DomainResult<Vec<Account>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>>;

    async fn insert_account(&self, account: NewAccount) -> DomainResult<Account>;
    /// `Ok(None)` when `id` does not resolve.
    async fn update_profile(&self, id: &str, profile: AccountProfile)
        -> DomainResult<Option<Account>>;
    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()>;
    async fn delete_account(&self, id: &str) -> DomainResult<()>;

    async fn ping(&self) -> DomainResult<()>;
}
