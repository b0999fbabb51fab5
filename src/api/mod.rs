/// API routes and handlers
pub mod admin;
pub mod auth;
pub mod middleware;
pub mod superadmin;
pub mod user;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .nest("/api/auth", auth::routes())
        .nest("/api/admin", admin::routes())
        .nest("/api/users", user::routes())
        .nest("/api/superadmin", superadmin::routes())
}
