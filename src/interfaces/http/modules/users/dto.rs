//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::application::CreatedAccount;
use crate::domain::{AccountView, ChangePasswordDto, CreateAccountDto, UpdateAccountDto};
use crate::shared::validate_password_strength;

/// User API representation (never includes the password)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountView> for UserDto {
    fn from(v: AccountView) -> Self {
        Self {
            id: v.id,
            name: v.name,
            email: v.email,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 32, message = "must be 6-32 characters"))]
    pub password: String,
    #[validate(length(min = 6, max = 32, message = "must be 6-32 characters"))]
    pub password_confirm: String,
}

impl From<CreateUserRequest> for CreateAccountDto {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
            password_confirm: r.password_confirm,
        }
    }
}

/// Created user response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedUserResponse {
    pub name: String,
    pub email: String,
}

impl From<CreatedAccount> for CreatedUserResponse {
    fn from(c: CreatedAccount) -> Self {
        Self {
            name: c.name,
            email: c.email,
        }
    }
}

/// Update user request; both fields are replaced.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

impl From<UpdateUserRequest> for UpdateAccountDto {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
        }
    }
}

/// Change password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password
    #[validate(length(min = 6, max = 32, message = "must be 6-32 characters"))]
    pub password: String,
    #[validate(length(min = 6, max = 32, message = "must be 6-32 characters"))]
    pub new_password: String,
    #[validate(length(min = 6, max = 32, message = "must be 6-32 characters"))]
    pub new_password_confirm: String,
}

impl From<ChangePasswordRequest> for ChangePasswordDto {
    fn from(r: ChangePasswordRequest) -> Self {
        Self {
            current_password: r.password,
            new_password: r.new_password,
            new_password_confirm: r.new_password_confirm,
        }
    }
}

/// Response carrying only the affected user id
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserIdResponse {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Requests that introduce a new secret and can be held to the strict
/// password rule.
pub trait NewSecrets {
    fn new_secrets(&self) -> Vec<(&'static str, &str)>;

    fn check_password_strength(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in self.new_secrets() {
            if let Err(e) = validate_password_strength(value) {
                errors.add(field, e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl NewSecrets for CreateUserRequest {
    fn new_secrets(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("password", self.password.as_str()),
            ("password_confirm", self.password_confirm.as_str()),
        ]
    }
}

impl NewSecrets for ChangePasswordRequest {
    fn new_secrets(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("new_password", self.new_password.as_str()),
            ("new_password_confirm", self.new_password_confirm.as_str()),
        ]
    }
}
