/// One-time token engine
///
/// Issues and single-use-consumes the short-lived codes backing email
/// verification and password reset. Issuing a new credential invalidates
/// every unused one for the same (email, purpose) pair, so at most one
/// code is ever outstanding; consumption is a single conditional UPDATE,
/// so two racing consumers of the same code cannot both succeed.
use crate::{
    clock::Clock,
    db::models::TokenPurpose,
    error::{CampusError, CampusResult},
};
use chrono::Duration;
use rand::Rng;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Shape of the issued credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    /// 6 decimal digits, 10-minute validity
    Otp,
    /// 32-character alphanumeric token, 24-hour validity
    MagicLink,
}

/// One-time token engine service
pub struct TokenEngine {
    db: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl TokenEngine {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Issue a fresh credential for (email, purpose)
    ///
    /// Marks all prior unused credentials for the pair as used before
    /// inserting the new one. Returns the plaintext code; sending it to
    /// the subject is the caller's concern.
    pub async fn issue(
        &self,
        email: &str,
        purpose: TokenPurpose,
        kind: CodeKind,
    ) -> CampusResult<String> {
        let code = match kind {
            CodeKind::Otp => generate_otp_code(),
            CodeKind::MagicLink => generate_magic_token(),
        };
        let now = self.clock.now();
        let expires_at = now
            + match kind {
                CodeKind::Otp => Duration::minutes(10),
                CodeKind::MagicLink => Duration::hours(24),
            };

        // Invalidate any outstanding credentials for this email and purpose
        sqlx::query(
            "UPDATE one_time_credentials SET used = 1 WHERE email = ?1 AND purpose = ?2 AND used = 0",
        )
        .bind(email)
        .bind(purpose)
        .execute(&self.db)
        .await
        .map_err(CampusError::Database)?;

        sqlx::query(
            "INSERT INTO one_time_credentials (id, email, code, purpose, expires_at, used, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(email)
        .bind(&code)
        .bind(purpose)
        .bind(expires_at)
        .bind(false)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(CampusError::Database)?;

        tracing::debug!(email, purpose = purpose.as_db_str(), "Issued one-time credential");

        Ok(code)
    }

    /// Consume a credential, exactly once
    ///
    /// The lookup and the used-flag flip are one conditional UPDATE: of two
    /// concurrent consumers only one observes rows_affected == 1. Expired
    /// credentials never match regardless of the used flag.
    pub async fn consume(
        &self,
        email: &str,
        code: &str,
        purpose: TokenPurpose,
    ) -> CampusResult<()> {
        let now = self.clock.now();

        let result = sqlx::query(
            "UPDATE one_time_credentials SET used = 1
             WHERE email = ?1 AND code = ?2 AND purpose = ?3 AND used = 0 AND expires_at > ?4",
        )
        .bind(email)
        .bind(code)
        .bind(purpose)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(CampusError::Database)?;

        if result.rows_affected() == 0 {
            return Err(CampusError::ExpiredOrConsumed);
        }

        Ok(())
    }

    /// Delete credentials past their expiry. Passive GC only; the expiry
    /// predicate inside `consume` is what enforces correctness.
    pub async fn purge_expired(&self) -> CampusResult<u64> {
        let result = sqlx::query("DELETE FROM one_time_credentials WHERE expires_at < ?1")
            .bind(self.clock.now())
            .execute(&self.db)
            .await
            .map_err(CampusError::Database)?;

        Ok(result.rows_affected())
    }
}

impl TokenPurpose {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

/// 6 decimal digits
fn generate_otp_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..1_000_000).to_string()
}

/// 32 characters drawn from [A-Za-z0-9]
fn generate_magic_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                             abcdefghijklmnopqrstuvwxyz\
                             0123456789";
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
