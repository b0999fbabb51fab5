/// Public authentication endpoints
use crate::{
    account::{
        validate_request, AdminRegisterRequest, AdminRegistered, ForgotPasswordRequest,
        LoginRequest, LoginResponse, RefreshTokenRequest, ResetPasswordRequest, VerifyOtpRequest,
    },
    context::AppContext,
    error::{CampusError, CampusResult},
    institution::InstitutionSummary,
    session::SessionPair,
};
use axum::{
    extract::{Query, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

/// Build authentication routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/institutions", get(list_institutions))
        .route("/admin/register", post(register_admin))
        .route("/login", post(login))
        .route("/verify-email", get(verify_email))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/refresh-token", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

/// Active institutions for the signup dropdown
async fn list_institutions(
    State(ctx): State<AppContext>,
) -> CampusResult<Json<Vec<InstitutionSummary>>> {
    let institutions = ctx.institution_manager.list_active().await?;
    Ok(Json(institutions))
}

/// Admin self-registration for an existing institution
async fn register_admin(
    State(ctx): State<AppContext>,
    Json(req): Json<AdminRegisterRequest>,
) -> CampusResult<Json<AdminRegistered>> {
    validate_request(&req)?;
    let registered = ctx.account_manager.register_admin(&req).await?;
    Ok(Json(registered))
}

/// Login endpoint
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> CampusResult<Json<LoginResponse>> {
    validate_request(&req)?;
    let response = ctx
        .account_manager
        .login(&req.email, &req.password, req.user_type)
        .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct VerifyEmailParams {
    token: String,
    email: String,
}

/// Magic-link email verification (opened from the activation email)
async fn verify_email(
    State(ctx): State<AppContext>,
    Query(params): Query<VerifyEmailParams>,
) -> CampusResult<Html<String>> {
    ctx.account_manager
        .verify_email_token(&params.email, &params.token)
        .await?;

    let login_url = format!("{}/login", ctx.config.service.frontend_url);
    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Email Verified</title>
  <meta http-equiv="refresh" content="3;url={login_url}">
</head>
<body>
  <h1>Email verified</h1>
  <p>Your account has been activated. Redirecting to the login page...</p>
  <p><a href="{login_url}">Continue to login</a></p>
</body>
</html>
"#
    )))
}

/// OTP-based email verification (admin registration path)
async fn verify_otp(
    State(ctx): State<AppContext>,
    Json(req): Json<VerifyOtpRequest>,
) -> CampusResult<Json<serde_json::Value>> {
    validate_request(&req)?;
    ctx.account_manager.verify_otp(&req.email, &req.code).await?;

    Ok(Json(serde_json::json!({
        "message": "Email verified successfully"
    })))
}

#[derive(Debug, Deserialize)]
struct ResendOtpRequest {
    email: String,
}

/// Re-issue a verification OTP
async fn resend_otp(
    State(ctx): State<AppContext>,
    Json(req): Json<ResendOtpRequest>,
) -> CampusResult<Json<serde_json::Value>> {
    if req.email.is_empty() {
        return Err(CampusError::Validation("Email is required".to_string()));
    }

    ctx.account_manager.resend_verification(&req.email).await?;

    Ok(Json(serde_json::json!({ "message": "OTP sent successfully" })))
}

/// Exchange a refresh token for a fresh session pair
async fn refresh_token(
    State(ctx): State<AppContext>,
    Json(req): Json<RefreshTokenRequest>,
) -> CampusResult<Json<SessionPair>> {
    if req.refresh_token.is_empty() {
        return Err(CampusError::Validation(
            "Refresh token is required".to_string(),
        ));
    }

    let pair = ctx.account_manager.refresh_session(&req.refresh_token).await?;
    Ok(Json(pair))
}

/// Start a password reset
///
/// The response is identical whether or not the account exists: the
/// endpoint never confirms registration status.
async fn forgot_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ForgotPasswordRequest>,
) -> CampusResult<Json<serde_json::Value>> {
    validate_request(&req)?;

    let _ = ctx
        .account_manager
        .forgot_password(&req.email, req.user_type)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "If an account exists with this email, you will receive a password reset code."
    })))
}

/// Complete a password reset with the emailed OTP
async fn reset_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> CampusResult<Json<serde_json::Value>> {
    validate_request(&req)?;

    if req.new_password != req.confirm_password {
        return Err(CampusError::Validation("Passwords don't match".to_string()));
    }

    ctx.account_manager
        .reset_password(&req.email, &req.code, &req.new_password)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Password reset successfully. You can now login with your new password."
    })))
}
