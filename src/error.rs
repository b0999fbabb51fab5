/// Unified error types for the Campus ID service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum CampusError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed input, carries field-level detail
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique-constraint violation (e.g. email already registered)
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Referenced account/institution absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Collapsed login failure. Deliberately carries no detail: a wrong
    /// password and a nonexistent account must be indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Login precondition: the account exists and the password matched,
    /// but the email has not been verified yet
    #[error("Email not verified")]
    VerificationRequired { email: String },

    /// Login precondition: account status is not active
    #[error("Account is not active")]
    AccountNotActive,

    /// Session token signature/expiry failure, collapsed; callers never
    /// learn whether the signature or the expiry was at fault
    #[error("Invalid token")]
    InvalidToken,

    /// One-time credential missing, already used, or past expiry
    #[error("Invalid or expired code")]
    ExpiredOrConsumed,

    /// Password reuse / same-as-current rejection
    #[error("Password policy violation: {0}")]
    PolicyViolation(String),

    /// Lost a conditional-update race against a concurrent writer
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Role/permission gate on the HTTP surface
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_verification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Convert CampusError to HTTP response
impl IntoResponse for CampusError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            CampusError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "ValidationError", self.to_string())
            }
            CampusError::Duplicate(_) => (StatusCode::CONFLICT, "Duplicate", self.to_string()),
            CampusError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            CampusError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "InvalidCredentials",
                "Invalid credentials".to_string(),
            ),
            CampusError::VerificationRequired { .. } => (
                StatusCode::FORBIDDEN,
                "VerificationRequired",
                "Email not verified".to_string(),
            ),
            CampusError::AccountNotActive => (
                StatusCode::FORBIDDEN,
                "AccountNotActive",
                "Account is not active".to_string(),
            ),
            CampusError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "InvalidToken",
                "Invalid or expired token".to_string(),
            ),
            CampusError::ExpiredOrConsumed => (
                StatusCode::BAD_REQUEST,
                "ExpiredOrConsumed",
                "Invalid or expired code".to_string(),
            ),
            CampusError::PolicyViolation(_) => {
                (StatusCode::BAD_REQUEST, "PolicyViolation", self.to_string())
            }
            CampusError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            CampusError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", self.to_string()),
            CampusError::Database(_) | CampusError::Internal(_) | CampusError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        // VerificationRequired carries the email so the client can offer a resend
        let (requires_verification, email) = match self {
            CampusError::VerificationRequired { email } => (Some(true), Some(email)),
            _ => (None, None),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            requires_verification,
            email,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type CampusResult<T> = Result<T, CampusError>;
