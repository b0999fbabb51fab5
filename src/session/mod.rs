/// Session token issuer
///
/// Stateless JWT pairs: a 24-hour access token carrying the full identity
/// claims and a 7-day refresh token carrying only the subject, signed with
/// independent secrets. There is no server-side revocation list: validity
/// is signature plus expiry, and logout stays client-side.
use crate::{
    db::models::Role,
    error::{CampusError, CampusResult},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const ACCESS_TTL_HOURS: i64 = 24;
const REFRESH_TTL_DAYS: i64 = 7;

/// Claims embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Account id
    pub sub: String,
    pub role: Role,
    pub institution_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims embedded in a refresh token. Subject only, so a refresh is
/// forced to re-read the account's current role/institution/email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Access + refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Session token issuer service
#[derive(Clone)]
pub struct SessionIssuer {
    access_secret: String,
    refresh_secret: String,
}

impl SessionIssuer {
    pub fn new(access_secret: String, refresh_secret: String) -> Self {
        Self {
            access_secret,
            refresh_secret,
        }
    }

    /// Issue a fresh token pair for an account
    pub fn issue_pair(
        &self,
        account_id: &str,
        role: Role,
        institution_id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> CampusResult<SessionPair> {
        let iat = now.timestamp();

        let access_claims = AccessClaims {
            sub: account_id.to_string(),
            role,
            institution_id: institution_id.to_string(),
            email: email.to_string(),
            iat,
            exp: (now + Duration::hours(ACCESS_TTL_HOURS)).timestamp(),
        };

        let refresh_claims = RefreshClaims {
            sub: account_id.to_string(),
            iat,
            exp: (now + Duration::days(REFRESH_TTL_DAYS)).timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
        .map_err(|e| CampusError::Internal(format!("Failed to sign access token: {}", e)))?;

        let refresh_token = encode(
            &Header::default(),
            &refresh_claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )
        .map_err(|e| CampusError::Internal(format!("Failed to sign refresh token: {}", e)))?;

        Ok(SessionPair {
            access_token,
            refresh_token,
        })
    }

    /// Validate an access token. Bad signature, expiry, and malformed input
    /// all collapse to InvalidToken.
    pub fn verify_access(&self, token: &str) -> CampusResult<AccessClaims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| CampusError::InvalidToken)
    }

    /// Validate a refresh token, same collapsed failure mode
    pub fn verify_refresh(&self, token: &str) -> CampusResult<RefreshClaims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| CampusError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(
            "access-secret-for-tests-0123456789ab".to_string(),
            "refresh-secret-for-tests-0123456789a".to_string(),
        )
    }

    #[test]
    fn access_token_carries_full_claims() {
        let issuer = issuer();
        let pair = issuer
            .issue_pair("acct-1", Role::Lecturer, "inst-1", "l@uni.edu", Utc::now())
            .unwrap();

        let claims = issuer.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "acct-1");
        assert_eq!(claims.role, Role::Lecturer);
        assert_eq!(claims.institution_id, "inst-1");
        assert_eq!(claims.email, "l@uni.edu");
        assert_eq!(claims.exp - claims.iat, ACCESS_TTL_HOURS * 3600);
    }

    #[test]
    fn refresh_token_carries_subject_only() {
        let issuer = issuer();
        let pair = issuer
            .issue_pair("acct-1", Role::Student, "inst-1", "s@uni.edu", Utc::now())
            .unwrap();

        let claims = issuer.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(claims.sub, "acct-1");
        assert_eq!(claims.exp - claims.iat, REFRESH_TTL_DAYS * 86400);
    }

    #[test]
    fn tokens_are_not_interchangeable() {
        let issuer = issuer();
        let pair = issuer
            .issue_pair("acct-1", Role::Student, "inst-1", "s@uni.edu", Utc::now())
            .unwrap();

        // Distinct secrets: a refresh token never validates as access and
        // vice versa
        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(CampusError::InvalidToken)
        ));
        assert!(matches!(
            issuer.verify_refresh(&pair.access_token),
            Err(CampusError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_collapses_to_invalid_token() {
        let issuer = issuer();
        assert!(matches!(
            issuer.verify_access("not-a-jwt"),
            Err(CampusError::InvalidToken)
        ));
        assert!(matches!(
            issuer.verify_refresh(""),
            Err(CampusError::InvalidToken)
        ));
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let issuer = issuer();
        let past = Utc::now() - Duration::days(2);
        let pair = issuer
            .issue_pair("acct-1", Role::Student, "inst-1", "s@uni.edu", past)
            .unwrap();

        assert!(matches!(
            issuer.verify_access(&pair.access_token),
            Err(CampusError::InvalidToken)
        ));
        // The 7-day refresh token from the same moment is still good
        assert!(issuer.verify_refresh(&pair.refresh_token).is_ok());
    }
}
