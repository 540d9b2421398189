//! Shared HTTP plumbing: error envelope and the validating JSON extractor.

pub mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::application::AccountError;

/// Error body returned by every failing endpoint.
///
/// `{"statusCode": 409, "error": "EMAIL_ALREADY_TAKEN_ERROR",
///   "description": "Email already taken", "message": "Email already exist"}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// HTTP status code, repeated in the body
    pub status_code: u16,
    /// Machine-readable error code
    pub error: String,
    /// Generic description of the error kind
    pub description: String,
    /// Message specific to this failure
    pub message: String,
}

impl ErrorBody {
    pub fn new(
        status: StatusCode,
        code: &str,
        description: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status_code: status.as_u16(),
            error: code.to_string(),
            description: description.to_string(),
            message: message.into(),
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Status, error code and description for each business outcome.
pub fn account_error_parts(err: &AccountError) -> (StatusCode, &'static str, &'static str) {
    match err {
        AccountError::PasswordMismatch => (
            StatusCode::FORBIDDEN,
            "INVALID_PASSWORD_ERROR",
            "Invalid password",
        ),
        AccountError::EmailTaken => (
            StatusCode::CONFLICT,
            "EMAIL_ALREADY_TAKEN_ERROR",
            "Email already taken",
        ),
        AccountError::InvalidCredentials => (
            StatusCode::FORBIDDEN,
            "INVALID_CREDENTIALS_ERROR",
            "Invalid credentials",
        ),
        AccountError::NotFound
        | AccountError::CreationFailed
        | AccountError::UpdateFailed
        | AccountError::DeletionFailed => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "UNPROCESSABLE_ENTITY_ERROR",
            "Unprocessable entity",
        ),
        AccountError::Unavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE_ERROR",
            "Service unavailable",
        ),
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let (status, code, description) = account_error_parts(&self);
        ErrorBody::new(status, code, description, self.to_string()).into_response_with(status)
    }
}

/// Failure of a handler: either the request was invalid or the service
/// refused it.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationErrors),
    Account(AccountError),
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        Self::Account(e)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                ValidatedJsonRejection::ValidationError(errors).into_response()
            }
            Self::Account(e) => e.into_response(),
        }
    }
}
