/// Authenticated user endpoints
use crate::{
    account::{validate_request, AccountSummary, ChangePasswordRequest, DashboardStats, UpdateProfileRequest},
    api::middleware,
    context::AppContext,
    error::{CampusError, CampusResult},
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post, put},
    Json, Router,
};

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", put(change_password))
        .route("/logout", post(logout))
        .route("/dashboard-stats", get(dashboard_stats))
}

/// Current user's profile with the institution name resolved
async fn get_profile(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> CampusResult<Json<AccountSummary>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;

    let summary = ctx.account_manager.profile(&auth.account_id).await?;
    Ok(Json(summary))
}

/// Partial profile update
async fn update_profile(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> CampusResult<Json<serde_json::Value>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;

    ctx.account_manager
        .update_profile(&auth.account_id, &req)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Profile updated successfully"
    })))
}

/// Change the password; clears the first-login flag
async fn change_password(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> CampusResult<Json<serde_json::Value>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;
    validate_request(&req)?;

    if req.new_password != req.confirm_password {
        return Err(CampusError::Validation("Passwords don't match".to_string()));
    }

    ctx.account_manager
        .change_password(&auth.account_id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Password changed successfully"
    })))
}

/// Logout
///
/// Session tokens have no server-side revocation, so logout is handled
/// client-side by discarding the pair; this endpoint only records the
/// event for auditing.
async fn logout(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> CampusResult<Json<serde_json::Value>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;

    tracing::info!(
        email = %auth.email,
        role = auth.role.as_str(),
        "User logged out"
    );

    Ok(Json(serde_json::json!({
        "message": "Logged out successfully"
    })))
}

/// Per-institution dashboard counts (admin only)
async fn dashboard_stats(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> CampusResult<Json<DashboardStats>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;
    middleware::require_admin(&auth)?;

    let stats = ctx
        .account_manager
        .dashboard_stats(&auth.institution_id)
        .await?;

    Ok(Json(stats))
}
