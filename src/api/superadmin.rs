/// Superadmin institution endpoints, guarded by a static API key header
use crate::{
    account::validate_request,
    api::middleware,
    context::AppContext,
    db::models::{Institution, InstitutionStatus},
    error::CampusResult,
    institution::CreateInstitutionRequest,
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

/// Build superadmin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/institutions", post(create_institution).get(list_institutions))
        .route("/institutions/:code/status", patch(set_institution_status))
}

/// Register a new institution tenant
async fn create_institution(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<CreateInstitutionRequest>,
) -> CampusResult<Json<Institution>> {
    middleware::require_super_admin_key(&ctx, &headers)?;
    validate_request(&req)?;

    let institution = ctx.institution_manager.create(&req).await?;
    Ok(Json(institution))
}

/// List all institutions
async fn list_institutions(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> CampusResult<Json<Vec<Institution>>> {
    middleware::require_super_admin_key(&ctx, &headers)?;

    let institutions = ctx.institution_manager.list().await?;
    Ok(Json(institutions))
}

#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    status: InstitutionStatus,
}

/// Update an institution's status (activate / suspend / retire)
async fn set_institution_status(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(code): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> CampusResult<Json<serde_json::Value>> {
    middleware::require_super_admin_key(&ctx, &headers)?;

    ctx.institution_manager.set_status(&code, req.status).await?;

    Ok(Json(serde_json::json!({
        "message": "Institution status updated"
    })))
}
