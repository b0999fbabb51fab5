/// Account management system
///
/// Request/response types for registration, provisioning, login, and the
/// credential lifecycle operations.

mod manager;

pub use manager::AccountManager;

use crate::db::models::Role;
use crate::error::{CampusError, CampusResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Run derive-based validation and surface field-level detail
pub fn validate_request<T: Validate>(req: &T) -> CampusResult<()> {
    req.validate().map_err(|errors| {
        let detail = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {}", field, messages)
            })
            .collect::<Vec<_>>()
            .join("; ");
        CampusError::Validation(detail)
    })
}

/// Admin self-registration against an existing institution
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegisterRequest {
    #[validate(length(min = 3, max = 20, message = "Institution code is required"))]
    pub institution_code: String,
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub admin_first_name: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub admin_last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub admin_email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 8, message = "Confirm password must be at least 8 characters"))]
    pub confirm_password: String,
}

/// Admin registration outcome
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegistered {
    pub admin_id: String,
    pub email: String,
    pub institution_name: String,
    pub institution_code: String,
}

/// Login request. `email` also accepts a student/lecturer id
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email or ID is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub user_type: Role,
}

/// Profile summary returned on login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub user_type: Role,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<String>,
    pub institution_id: String,
    pub institution_name: String,
    pub is_first_login: bool,
}

/// Login response: summary plus the session pair
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: AccountSummary,
    pub access_token: String,
    pub refresh_token: String,
}

/// OTP verification request (6-digit code)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP code must be 6 digits"))]
    pub code: String,
}

/// Forgot-password request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub user_type: Role,
}

/// Password reset completion
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP code must be 6 digits"))]
    pub code: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
    #[validate(length(min = 8, message = "Confirm password must be at least 8 characters"))]
    pub confirm_password: String,
}

/// Authenticated password change
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
    #[validate(length(min = 8, message = "Confirm password must be at least 8 characters"))]
    pub confirm_password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Student provisioning request (admin only)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
    #[validate(length(min = 1, message = "Academic year is required"))]
    pub year: String,
}

/// Lecturer provisioning request (admin only)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLecturerRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
    /// Prof, Dr, Mr, Mrs, or Ms
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub specialization: Option<String>,
}

/// Provisioning outcome. Includes the default password for the admin's
/// reference; the account owner must change it on first login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedAccount {
    pub id: String,
    pub email: String,
    pub role_identifier: String,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
    pub default_password: String,
}

/// Profile update (all fields optional, partial update)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
}

/// Per-institution account listing entry (no credential material)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    pub status: String,
    pub email_verified: bool,
}

/// Dashboard counts for an institution
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub students: i64,
    pub lecturers: i64,
    pub admins: i64,
    pub active: i64,
    pub pending: i64,
    pub suspended: i64,
}

/// Identity resolved from a bearer token, after the account re-check
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: String,
    pub role: Role,
    pub institution_id: String,
    pub email: String,
}
