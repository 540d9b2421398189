use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{
    Account, AccountProfile, AccountRepository, CredentialStore, DomainError, DomainResult,
    NewAccount,
};
use crate::infrastructure::database::entities::account;

pub struct SeaOrmAccountRepository {
    db: DatabaseConnection,
}

impl SeaOrmAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn account_model_to_domain(model: account::Model) -> Account {
    Account {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn not_found(id: &str) -> DomainError {
    DomainError::NotFound {
        entity: "Account",
        field: "id",
        value: id.to_string(),
    }
}

#[async_trait]
impl CredentialStore for SeaOrmAccountRepository {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>> {
        let model = account::Entity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(model.map(account_model_to_domain))
    }
}

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn list_accounts(&self) -> DomainResult<Vec<Account>> {
        let models = account::Entity::find()
            .order_by_asc(account::Column::CreatedAt)
            .order_by_asc(account::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(account_model_to_domain).collect())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>> {
        let model = account::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(account_model_to_domain))
    }

    async fn insert_account(&self, new_account: NewAccount) -> DomainResult<Account> {
        let now = Utc::now();

        let row = account::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(new_account.name),
            email: Set(new_account.email),
            password_hash: Set(new_account.password_hash),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = row.insert(&self.db).await?;
        Ok(account_model_to_domain(model))
    }

    async fn update_profile(
        &self,
        id: &str,
        profile: AccountProfile,
    ) -> DomainResult<Option<Account>> {
        let Some(existing) = account::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: account::ActiveModel = existing.into();
        active.name = Set(profile.name);
        active.email = Set(profile.email);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(Some(account_model_to_domain(updated)))
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()> {
        let Some(existing) = account::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(not_found(id));
        };

        let mut active: account::ActiveModel = existing.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        Ok(())
    }

    async fn delete_account(&self, id: &str) -> DomainResult<()> {
        let result = account::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db.ping().await?;
        Ok(())
    }
}
