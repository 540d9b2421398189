//! In-memory account store

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    Account, AccountProfile, AccountRepository, CredentialStore, DomainError, DomainResult,
    NewAccount,
};

/// In-memory store for development and testing.
///
/// `emails` maps each claimed email to the owning account id. A claim goes
/// through the map's entry API, so two writers can never both own one email.
/// Lock order is `accounts` then `emails`; only `update_profile` holds both.
pub struct InMemoryAccountRepository {
    accounts: DashMap<String, Account>,
    emails: DashMap<String, String>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            emails: DashMap::new(),
        }
    }

    fn claim_email(&self, email: &str, id: &str) -> DomainResult<()> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(owner) if owner.get() != id => Err(DomainError::Conflict(format!(
                "email {} is already registered",
                email
            ))),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            }
        }
    }

    fn release_email(&self, email: &str, id: &str) {
        self.emails.remove_if(email, |_, owner| owner == id);
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>> {
        let Some(id) = self.emails.get(email).map(|owner| owner.value().clone()) else {
            return Ok(None);
        };
        Ok(self
            .accounts
            .get(&id)
            .filter(|a| a.email == email)
            .map(|a| a.value().clone()))
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn list_accounts(&self) -> DomainResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|a| a.value().clone()).collect();
        accounts.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(accounts)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>> {
        Ok(self.accounts.get(id).map(|a| a.value().clone()))
    }

    async fn insert_account(&self, new_account: NewAccount) -> DomainResult<Account> {
        let id = uuid::Uuid::new_v4().to_string();
        self.claim_email(&new_account.email, &id)?;

        let now = Utc::now();
        let account = Account {
            id: id.clone(),
            name: new_account.name,
            email: new_account.email,
            password_hash: new_account.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(id, account.clone());

        Ok(account)
    }

    async fn update_profile(
        &self,
        id: &str,
        profile: AccountProfile,
    ) -> DomainResult<Option<Account>> {
        // The account guard serializes updates of one id, so the email
        // released below is always the one this update replaced.
        let Some(mut entry) = self.accounts.get_mut(id) else {
            return Ok(None);
        };

        self.claim_email(&profile.email, id)?;

        let previous_email = std::mem::replace(&mut entry.email, profile.email);
        entry.name = profile.name;
        entry.updated_at = Utc::now();
        let updated = entry.clone();

        if previous_email != updated.email {
            self.release_email(&previous_email, id);
        }
        drop(entry);

        Ok(Some(updated))
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()> {
        let Some(mut entry) = self.accounts.get_mut(id) else {
            return Err(DomainError::NotFound {
                entity: "Account",
                field: "id",
                value: id.to_string(),
            });
        };
        entry.password_hash = password_hash.to_string();
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_account(&self, id: &str) -> DomainResult<()> {
        let Some((_, removed)) = self.accounts.remove(id) else {
            return Err(DomainError::NotFound {
                entity: "Account",
                field: "id",
                value: id.to_string(),
            });
        };
        self.release_email(&removed.email, id);
        Ok(())
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
