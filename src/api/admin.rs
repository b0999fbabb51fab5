/// Admin provisioning endpoints
use crate::{
    account::{
        validate_request, CreateLecturerRequest, CreateStudentRequest, ProvisionedAccount,
        RosterEntry,
    },
    api::middleware,
    context::AppContext,
    db::models::Role,
    error::CampusResult,
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};

/// Build admin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/students", post(create_student).get(list_students))
        .route("/lecturers", post(create_lecturer).get(list_lecturers))
}

/// Provision a student account
async fn create_student(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<CreateStudentRequest>,
) -> CampusResult<Json<ProvisionedAccount>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;
    middleware::require_admin(&auth)?;
    validate_request(&req)?;

    let provisioned = ctx
        .account_manager
        .provision_student(&auth.account_id, &req)
        .await?;

    Ok(Json(provisioned))
}

/// Provision a lecturer account
async fn create_lecturer(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<CreateLecturerRequest>,
) -> CampusResult<Json<ProvisionedAccount>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;
    middleware::require_admin(&auth)?;
    validate_request(&req)?;

    let provisioned = ctx
        .account_manager
        .provision_lecturer(&auth.account_id, &req)
        .await?;

    Ok(Json(provisioned))
}

/// List students of the admin's institution
async fn list_students(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> CampusResult<Json<Vec<RosterEntry>>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;
    middleware::require_admin(&auth)?;

    let roster = ctx
        .account_manager
        .roster(&auth.institution_id, Role::Student)
        .await?;

    Ok(Json(roster))
}

/// List lecturers of the admin's institution
async fn list_lecturers(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> CampusResult<Json<Vec<RosterEntry>>> {
    let auth = middleware::require_auth(State(ctx.clone()), headers).await?;
    middleware::require_admin(&auth)?;

    let roster = ctx
        .account_manager
        .roster(&auth.institution_id, Role::Lecturer)
        .await?;

    Ok(Json(roster))
}
