/// Authentication and authorization middleware
use crate::{
    account::AuthUser,
    context::AppContext,
    db::models::Role,
    error::{CampusError, CampusResult},
};
use axum::{extract::State, http::HeaderMap};

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Require authentication - resolve the bearer token or fail with 401
///
/// Token validation re-checks that the account is still active and
/// verified, so a suspension takes effect immediately even though the
/// token itself has no revocation list.
pub async fn require_auth(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> CampusResult<AuthUser> {
    let token = extract_bearer_token(&headers).ok_or(CampusError::InvalidToken)?;

    ctx.account_manager.validate_access(&token).await
}

/// Require the admin role on an already-authenticated identity
pub fn require_admin(user: &AuthUser) -> CampusResult<()> {
    if user.role != Role::Admin {
        return Err(CampusError::Forbidden(
            "Admin privileges required".to_string(),
        ));
    }
    Ok(())
}

/// Guard for the superadmin surface: a static API key header
pub fn require_super_admin_key(ctx: &AppContext, headers: &HeaderMap) -> CampusResult<()> {
    let provided = headers
        .get("x-super-admin-key")
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if key == ctx.config.authentication.super_admin_key => Ok(()),
        _ => Err(CampusError::InvalidToken),
    }
}
