//! User management API handlers
//!
//! Thin wrappers over `AccountService`: parse, validate, delegate, map the
//! outcome to a status code.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{
    ChangePasswordRequest, CreateUserRequest, CreatedUserResponse, MessageResponse, NewSecrets,
    UpdateUserRequest, UserDto, UserIdResponse,
};
use crate::application::AccountService;
use crate::interfaces::http::common::{ApiError, ErrorBody, ValidatedJson};

const PASSWORD_CHANGED: &str = "Password changed successfully";

#[derive(Clone)]
pub struct UserHandlerState {
    pub account_service: Arc<AccountService>,
    /// Hold new passwords to the upper/lower/digit/special rule.
    pub strict_passwords: bool,
}

impl UserHandlerState {
    fn check_strength(&self, request: &impl NewSecrets) -> Result<(), ApiError> {
        if self.strict_passwords {
            request.check_password_strength()?;
        }
        Ok(())
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = [UserDto]),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let accounts = state.account_service.list_accounts().await?;
    Ok(Json(accounts.into_iter().map(UserDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDto),
        (status = 422, description = "Unknown user", body = ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let account = state.account_service.get_account(&id).await?;
    Ok(Json(UserDto::from(account)))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = CreatedUserResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 403, description = "Password confirmation mismatch", body = ErrorBody),
        (status = 409, description = "Email already taken", body = ErrorBody),
        (status = 422, description = "Failed to create user", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<Json<CreatedUserResponse>, ApiError> {
    state.check_strength(&request)?;
    let created = state.account_service.create_account(request.into()).await?;
    Ok(Json(created.into()))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserIdResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 409, description = "Email already taken", body = ErrorBody),
        (status = 422, description = "Failed to update user", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserIdResponse>, ApiError> {
    let id = state
        .account_service
        .update_account(&id, request.into())
        .await?;
    Ok(Json(UserIdResponse { id }))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = UserIdResponse),
        (status = 422, description = "Failed to delete user", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<UserIdResponse>, ApiError> {
    let id = state.account_service.delete_account(&id).await?;
    Ok(Json(UserIdResponse { id }))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (
            status = 403,
            description = "Wrong current password or confirmation mismatch",
            body = ErrorBody
        ),
        (status = 422, description = "Failed to update password", body = ErrorBody)
    )
)]
pub async fn change_password(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.check_strength(&request)?;
    state
        .account_service
        .change_password(&id, request.into())
        .await?;
    Ok(Json(MessageResponse {
        message: PASSWORD_CHANGED.to_string(),
    }))
}
