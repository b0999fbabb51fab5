/// Database models and closed enums
///
/// Role, status, and purpose values travel as tagged variants rather than
/// free-form strings so illegal states never reach the store.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role within an institution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Student,
    Lecturer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Lecturer => "lecturer",
            Role::Admin => "admin",
        }
    }
}

/// Account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
        }
    }
}

/// Institution status (tenant-level gate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum InstitutionStatus {
    Active,
    Inactive,
    Suspended,
}

/// Purpose of a one-time credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

/// Account record in the database
///
/// `password_history` is a JSON array of up to 5 prior hashes,
/// most-recent-first. Accounts are never hard-deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub password_history: String,
    pub role: Role,
    pub institution_id: String,
    pub status: AccountStatus,
    pub email_verified: bool,
    pub is_first_login: bool,
    pub first_name: String,
    pub last_name: String,
    pub student_id: Option<String>,
    pub lecturer_id: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub lecturer_title: Option<String>,
    pub specialization: Option<String>,
    pub admin_title: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Decode the stored password history; absent/malformed history reads
    /// as empty (legacy accounts have no history column content).
    pub fn history(&self) -> Vec<String> {
        serde_json::from_str(&self.password_history).unwrap_or_default()
    }

    /// Identifier shown on the account's campus card, when the role has one
    pub fn role_identifier(&self) -> Option<&str> {
        match self.role {
            Role::Student => self.student_id.as_deref(),
            Role::Lecturer => self.lecturer_id.as_deref(),
            Role::Admin => None,
        }
    }
}

/// Encode a password history list for storage
pub fn encode_history(history: &[String]) -> String {
    serde_json::to_string(history).unwrap_or_else(|_| "[]".to_string())
}

/// Institution record (tenant boundary)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub code: String,
    pub domain: Option<String>,
    pub status: InstitutionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One-time credential record (OTP code or magic-link token)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OneTimeCredential {
    pub id: String,
    pub email: String,
    pub code: String,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}
