//! Account service: application-layer orchestration
//!
//! HTTP handlers are thin wrappers that delegate here.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::{AccountError, AccountResult};
use crate::domain::{
    AccountProfile, AccountRepository, AccountView, ChangePasswordDto, CreateAccountDto,
    DomainError, NewAccount, UpdateAccountDto,
};
use crate::infrastructure::crypto::password::{hash_password, verify_password, DEFAULT_COST};

/// Whether `update_account` lets an account keep its own email.
///
/// `Strict` rejects any existing holder of the email, including the account
/// being updated, so re-submitting an unchanged email fails with
/// `EmailTaken`. `ExemptSelf` ignores a match on the same id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateEmailPolicy {
    #[default]
    Strict,
    ExemptSelf,
}

#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    pub bcrypt_cost: u32,
    pub update_email_policy: UpdateEmailPolicy,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_COST,
            update_email_policy: UpdateEmailPolicy::Strict,
        }
    }
}

/// Returned by a successful create; never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    pub name: String,
    pub email: String,
}

/// Account service. Orchestrates the account use-cases over an injected
/// store.
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
    config: AccountServiceConfig,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepository>, config: AccountServiceConfig) -> Self {
        Self { repo, config }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_accounts(&self) -> AccountResult<Vec<AccountView>> {
        let result = self
            .repo
            .list_accounts()
            .await
            .map(|accounts| accounts.into_iter().map(AccountView::from).collect())
            .map_err(|e| classify(e, AccountError::Unavailable));
        record_outcome("list", &result);
        result
    }

    pub async fn get_account(&self, id: &str) -> AccountResult<AccountView> {
        let result = match self.repo.find_by_id(id).await {
            Ok(Some(account)) => Ok(AccountView::from(account)),
            Ok(None) => Err(AccountError::NotFound),
            Err(e) => Err(classify(e, AccountError::Unavailable)),
        };
        record_outcome("get", &result);
        result
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Confirmation is checked before the store is touched, so a mismatch
    /// is reported even when the email is also taken.
    pub async fn create_account(&self, dto: CreateAccountDto) -> AccountResult<CreatedAccount> {
        let result = self.try_create(dto).await;
        record_outcome("create", &result);
        result
    }

    pub async fn update_account(&self, id: &str, dto: UpdateAccountDto) -> AccountResult<String> {
        let result = self.try_update(id, dto).await;
        record_outcome("update", &result);
        result
    }

    pub async fn delete_account(&self, id: &str) -> AccountResult<String> {
        let result = match self.repo.delete_account(id).await {
            Ok(()) => {
                info!(account_id = id, "Account deleted");
                Ok(id.to_string())
            }
            Err(DomainError::NotFound { .. }) => Err(AccountError::DeletionFailed),
            Err(e) => Err(classify(e, AccountError::DeletionFailed)),
        };
        record_outcome("delete", &result);
        result
    }

    /// Self-service password change. The current password is re-verified
    /// before the new pair is even looked at.
    pub async fn change_password(&self, id: &str, dto: ChangePasswordDto) -> AccountResult<()> {
        let result = self.try_change_password(id, dto).await;
        record_outcome("change_password", &result);
        result
    }

    async fn try_create(&self, dto: CreateAccountDto) -> AccountResult<CreatedAccount> {
        if dto.password != dto.password_confirm {
            return Err(AccountError::PasswordMismatch);
        }

        let taken = self
            .repo
            .email_exists(&dto.email)
            .await
            .map_err(|e| classify(e, AccountError::CreationFailed))?;
        if taken {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = hash_password(&dto.password, self.config.bcrypt_cost).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            AccountError::CreationFailed
        })?;

        // A concurrent create can still win the email between the check
        // above and this insert; the store reports that as a conflict.
        let account = self
            .repo
            .insert_account(NewAccount {
                name: dto.name,
                email: dto.email,
                password_hash,
            })
            .await
            .map_err(|e| classify(e, AccountError::CreationFailed))?;

        info!(account_id = %account.id, "Account created");
        Ok(CreatedAccount {
            name: account.name,
            email: account.email,
        })
    }

    async fn try_update(&self, id: &str, dto: UpdateAccountDto) -> AccountResult<String> {
        let taken = match self.config.update_email_policy {
            UpdateEmailPolicy::Strict => self.repo.email_exists(&dto.email).await,
            UpdateEmailPolicy::ExemptSelf => self
                .repo
                .find_by_email(&dto.email)
                .await
                .map(|holder| holder.is_some_and(|holder| holder.id != id)),
        }
        .map_err(|e| classify(e, AccountError::UpdateFailed))?;
        if taken {
            return Err(AccountError::EmailTaken);
        }

        let profile = AccountProfile {
            name: dto.name,
            email: dto.email,
        };
        match self.repo.update_profile(id, profile).await {
            Ok(Some(account)) => {
                info!(account_id = %account.id, "Account updated");
                Ok(account.id)
            }
            Ok(None) => Err(AccountError::UpdateFailed),
            Err(e) => Err(classify(e, AccountError::UpdateFailed)),
        }
    }

    async fn try_change_password(&self, id: &str, dto: ChangePasswordDto) -> AccountResult<()> {
        let account = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| classify(e, AccountError::UpdateFailed))?;

        // An unknown id is indistinguishable from a wrong password.
        let verified = account
            .is_some_and(|account| verify_password(&dto.current_password, &account.password_hash));
        if !verified {
            return Err(AccountError::InvalidCredentials);
        }

        if dto.new_password != dto.new_password_confirm {
            return Err(AccountError::PasswordMismatch);
        }

        let new_hash = hash_password(&dto.new_password, self.config.bcrypt_cost).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            AccountError::UpdateFailed
        })?;

        self.repo
            .update_password_hash(id, &new_hash)
            .await
            .map_err(|e| classify(e, AccountError::UpdateFailed))?;

        info!(account_id = id, "Password changed");
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────

/// Translate a store error into the business outcome of the operation.
/// Only an unreachable store is logged at error level here; refusals are
/// logged once by `record_outcome`.
fn classify(err: DomainError, fallback: AccountError) -> AccountError {
    match err {
        DomainError::Unavailable(msg) => {
            error!(error = %msg, "Account store unavailable");
            AccountError::Unavailable
        }
        DomainError::Conflict(msg) => {
            debug!(error = %msg, "Store rejected duplicate email");
            AccountError::EmailTaken
        }
        other => {
            debug!(error = %other, "Account store rejected operation");
            fallback
        }
    }
}

fn record_outcome<T>(operation: &'static str, result: &AccountResult<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(AccountError::Unavailable) => AccountError::Unavailable.as_label(),
        Err(e) => {
            warn!(operation, reason = e.as_label(), "Account operation refused");
            e.as_label()
        }
    };
    metrics::counter!("account_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{Account, CredentialStore, DomainResult};
    use crate::infrastructure::crypto::password::MIN_COST;
    use crate::infrastructure::InMemoryAccountRepository;

    fn service_with(policy: UpdateEmailPolicy) -> (AccountService, Arc<InMemoryAccountRepository>) {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let service = AccountService::new(
            repo.clone(),
            AccountServiceConfig {
                bcrypt_cost: MIN_COST,
                update_email_policy: policy,
            },
        );
        (service, repo)
    }

    fn service() -> (AccountService, Arc<InMemoryAccountRepository>) {
        service_with(UpdateEmailPolicy::Strict)
    }

    fn create_dto(name: &str, email: &str, password: &str, confirm: &str) -> CreateAccountDto {
        CreateAccountDto {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
        }
    }

    fn change_dto(current: &str, new: &str, confirm: &str) -> ChangePasswordDto {
        ChangePasswordDto {
            current_password: current.to_string(),
            new_password: new.to_string(),
            new_password_confirm: confirm.to_string(),
        }
    }

    async fn create_ann(service: &AccountService, repo: &InMemoryAccountRepository) -> String {
        service
            .create_account(create_dto("Ann", "ann@x.com", "Secret1!", "Secret1!"))
            .await
            .unwrap();
        repo.find_by_email("ann@x.com").await.unwrap().unwrap().id
    }

    #[tokio::test]
    async fn create_returns_name_and_email_and_registers_the_email() {
        let (service, repo) = service();

        let created = service
            .create_account(create_dto("Ann", "ann@x.com", "Secret1!", "Secret1!"))
            .await
            .unwrap();

        assert_eq!(
            created,
            CreatedAccount {
                name: "Ann".into(),
                email: "ann@x.com".into()
            }
        );
        assert!(repo.email_exists("ann@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn create_stores_a_hash_not_the_password() {
        let (service, repo) = service();
        create_ann(&service, &repo).await;

        let stored = repo.find_by_email("ann@x.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "Secret1!");
        assert!(verify_password("Secret1!", &stored.password_hash));
    }

    #[tokio::test]
    async fn create_with_mismatched_confirmation_persists_nothing() {
        let (service, repo) = service();

        let err = service
            .create_account(create_dto("Ann", "ann@x.com", "Secret1!", "Secret2!"))
            .await
            .unwrap_err();

        assert_eq!(err, AccountError::PasswordMismatch);
        assert!(!repo.email_exists("ann@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn mismatch_is_reported_before_a_taken_email() {
        let (service, repo) = service();
        create_ann(&service, &repo).await;

        let err = service
            .create_account(create_dto("Ann", "ann@x.com", "Secret1!", "nope"))
            .await
            .unwrap_err();

        assert_eq!(err, AccountError::PasswordMismatch);
    }

    #[tokio::test]
    async fn create_with_taken_email_fails() {
        let (service, repo) = service();
        create_ann(&service, &repo).await;

        let err = service
            .create_account(create_dto("Other", "ann@x.com", "Another1!", "Another1!"))
            .await
            .unwrap_err();

        assert_eq!(err, AccountError::EmailTaken);
        assert_eq!(repo.list_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_creates_with_one_email_succeed_once() {
        let (service, repo) = service();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .create_account(create_dto(
                            &format!("Ann {i}"),
                            "ann@x.com",
                            "Secret1!",
                            "Secret1!",
                        ))
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert_eq!(e, AccountError::EmailTaken),
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(repo.list_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found_every_time() {
        let (service, _) = service();

        for _ in 0..3 {
            assert_eq!(
                service.get_account("missing").await.unwrap_err(),
                AccountError::NotFound
            );
        }
    }

    #[tokio::test]
    async fn get_is_stable_until_mutated() {
        let (service, repo) = service();
        let id = create_ann(&service, &repo).await;

        let first = service.get_account(&id).await.unwrap();
        let second = service.get_account(&id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "Ann");
    }

    #[tokio::test]
    async fn list_returns_views_in_creation_order() {
        let (service, _) = service();
        for (name, email) in [("Ann", "ann@x.com"), ("Bob", "bob@x.com")] {
            service
                .create_account(create_dto(name, email, "Secret1!", "Secret1!"))
                .await
                .unwrap();
        }

        let names: Vec<String> = service
            .list_accounts()
            .await
            .unwrap()
            .into_iter()
            .map(|view| view.name)
            .collect();
        assert_eq!(names, ["Ann", "Bob"]);
    }

    #[tokio::test]
    async fn update_then_get_reflects_new_profile() {
        let (service, repo) = service();
        let id = create_ann(&service, &repo).await;

        let updated_id = service
            .update_account(
                &id,
                UpdateAccountDto {
                    name: "Annie".into(),
                    email: "annie@x.com".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated_id, id);

        let view = service.get_account(&id).await.unwrap();
        assert_eq!(view.name, "Annie");
        assert_eq!(view.email, "annie@x.com");
    }

    #[tokio::test]
    async fn update_onto_another_accounts_email_fails() {
        let (service, repo) = service();
        create_ann(&service, &repo).await;
        service
            .create_account(create_dto("Bob", "bob@x.com", "Secret1!", "Secret1!"))
            .await
            .unwrap();
        let bob = repo.find_by_email("bob@x.com").await.unwrap().unwrap();

        let err = service
            .update_account(
                &bob.id,
                UpdateAccountDto {
                    name: "Bob".into(),
                    email: "ann@x.com".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::EmailTaken);
    }

    #[tokio::test]
    async fn strict_policy_rejects_unchanged_own_email() {
        let (service, repo) = service_with(UpdateEmailPolicy::Strict);
        let id = create_ann(&service, &repo).await;

        let err = service
            .update_account(
                &id,
                UpdateAccountDto {
                    name: "Annie".into(),
                    email: "ann@x.com".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::EmailTaken);
    }

    #[tokio::test]
    async fn exempt_self_policy_allows_unchanged_own_email() {
        let (service, repo) = service_with(UpdateEmailPolicy::ExemptSelf);
        let id = create_ann(&service, &repo).await;

        service
            .update_account(
                &id,
                UpdateAccountDto {
                    name: "Annie".into(),
                    email: "ann@x.com".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(service.get_account(&id).await.unwrap().name, "Annie");
    }

    #[tokio::test]
    async fn update_unknown_id_fails() {
        let (service, _) = service();

        let err = service
            .update_account(
                "missing",
                UpdateAccountDto {
                    name: "Ghost".into(),
                    email: "ghost@x.com".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::UpdateFailed);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (service, repo) = service();
        let id = create_ann(&service, &repo).await;

        assert_eq!(service.delete_account(&id).await.unwrap(), id);
        assert_eq!(
            service.get_account(&id).await.unwrap_err(),
            AccountError::NotFound
        );
        assert_eq!(
            service.delete_account(&id).await.unwrap_err(),
            AccountError::DeletionFailed
        );
    }

    #[tokio::test]
    async fn change_password_scenario() {
        let (service, repo) = service();
        let id = create_ann(&service, &repo).await;

        let err = service
            .create_account(create_dto("Ann", "ann@x.com", "Other1!x", "Other1!x"))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::EmailTaken);

        service
            .change_password(&id, change_dto("Secret1!", "Newpass2!", "Newpass2!"))
            .await
            .unwrap();

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert!(verify_password("Newpass2!", &stored.password_hash));
        assert!(!verify_password("Secret1!", &stored.password_hash));

        let err = service
            .change_password(&id, change_dto("wrong", "Newpass3!", "Newpass3!"))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::InvalidCredentials);
    }

    #[tokio::test]
    async fn wrong_current_password_wins_over_mismatch() {
        let (service, repo) = service();
        let id = create_ann(&service, &repo).await;

        let err = service
            .change_password(&id, change_dto("wrong", "Newpass2!", "different"))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::InvalidCredentials);
    }

    #[tokio::test]
    async fn change_password_with_mismatched_confirmation_keeps_old_hash() {
        let (service, repo) = service();
        let id = create_ann(&service, &repo).await;

        let err = service
            .change_password(&id, change_dto("Secret1!", "Newpass2!", "Newpass3!"))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::PasswordMismatch);

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert!(verify_password("Secret1!", &stored.password_hash));
    }

    #[tokio::test]
    async fn change_password_for_unknown_id_is_invalid_credentials() {
        let (service, _) = service();

        let err = service
            .change_password("missing", change_dto("Secret1!", "Newpass2!", "Newpass2!"))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::InvalidCredentials);
    }

    #[derive(Clone, Copy)]
    enum Failure {
        Storage,
        Unavailable,
        /// Email lookups miss but writes hit the unique constraint, as when
        /// another writer wins the race after the pre-check.
        Conflict,
    }

    /// Store whose every call (apart from email lookups) fails with a fixed error.
    struct BrokenStore {
        failure: Failure,
    }

    impl BrokenStore {
        fn error(&self) -> DomainError {
            match self.failure {
                Failure::Storage => DomainError::Storage("disk I/O error".into()),
                Failure::Unavailable => DomainError::Unavailable("connection refused".into()),
                Failure::Conflict => {
                    DomainError::Conflict("UNIQUE constraint failed: accounts.email".into())
                }
            }
        }
    }

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn find_by_email(&self, _email: &str) -> DomainResult<Option<Account>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl AccountRepository for BrokenStore {
        async fn list_accounts(&self) -> DomainResult<Vec<Account>> {
            Err(self.error())
        }
        async fn find_by_id(&self, _id: &str) -> DomainResult<Option<Account>> {
            Err(self.error())
        }
        async fn insert_account(&self, _account: NewAccount) -> DomainResult<Account> {
            Err(self.error())
        }
        async fn update_profile(
            &self,
            _id: &str,
            _profile: AccountProfile,
        ) -> DomainResult<Option<Account>> {
            Err(self.error())
        }
        async fn update_password_hash(&self, _id: &str, _hash: &str) -> DomainResult<()> {
            Err(self.error())
        }
        async fn delete_account(&self, _id: &str) -> DomainResult<()> {
            Err(self.error())
        }
        async fn ping(&self) -> DomainResult<()> {
            Err(self.error())
        }
    }

    fn broken_service(failure: Failure) -> AccountService {
        AccountService::new(
            Arc::new(BrokenStore { failure }),
            AccountServiceConfig {
                bcrypt_cost: MIN_COST,
                ..AccountServiceConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn write_failures_map_to_operation_failures() {
        let service = broken_service(Failure::Storage);

        assert_eq!(
            service
                .create_account(create_dto("Ann", "ann@x.com", "Secret1!", "Secret1!"))
                .await
                .unwrap_err(),
            AccountError::CreationFailed
        );
        assert_eq!(
            service
                .update_account(
                    "id",
                    UpdateAccountDto {
                        name: "Ann".into(),
                        email: "ann@x.com".into()
                    }
                )
                .await
                .unwrap_err(),
            AccountError::UpdateFailed
        );
        assert_eq!(
            service.delete_account("id").await.unwrap_err(),
            AccountError::DeletionFailed
        );
    }

    #[tokio::test]
    async fn unreachable_store_is_unavailable_not_a_business_error() {
        let service = broken_service(Failure::Unavailable);

        assert_eq!(
            service.list_accounts().await.unwrap_err(),
            AccountError::Unavailable
        );
        assert_eq!(
            service
                .update_account(
                    "id",
                    UpdateAccountDto {
                        name: "Ann".into(),
                        email: "ann@x.com".into()
                    }
                )
                .await
                .unwrap_err(),
            AccountError::Unavailable
        );
        assert_eq!(
            service.get_account("id").await.unwrap_err(),
            AccountError::Unavailable
        );
        assert_eq!(
            service
                .create_account(create_dto("Ann", "ann@x.com", "Secret1!", "Secret1!"))
                .await
                .unwrap_err(),
            AccountError::Unavailable
        );
        assert_eq!(
            service.delete_account("id").await.unwrap_err(),
            AccountError::Unavailable
        );
        assert_eq!(
            service
                .change_password("id", change_dto("Secret1!", "Newpass2!", "Newpass2!"))
                .await
                .unwrap_err(),
            AccountError::Unavailable
        );
    }

    #[tokio::test]
    async fn store_conflict_after_the_pre_check_is_email_taken() {
        let service = broken_service(Failure::Conflict);

        assert_eq!(
            service
                .create_account(create_dto("Ann", "ann@x.com", "Secret1!", "Secret1!"))
                .await
                .unwrap_err(),
            AccountError::EmailTaken
        );
        assert_eq!(
            service
                .update_account(
                    "id",
                    UpdateAccountDto {
                        name: "Ann".into(),
                        email: "ann@x.com".into()
                    }
                )
                .await
                .unwrap_err(),
            AccountError::EmailTaken
        );
    }
}
