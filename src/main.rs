/// Campus ID - institutional identity service
///
/// Multi-tenant campus identity platform: institutions as tenants,
/// admin-provisioned student/lecturer accounts, and a credential
/// lifecycle built on one-time codes, bcrypt password policy, and
/// stateless JWT session pairs.

mod account;
mod api;
mod clock;
mod config;
mod context;
mod db;
mod error;
mod institution;
mod jobs;
mod mailer;
mod otp;
mod password;
mod server;
mod session;

use config::ServerConfig;
use context::AppContext;
use error::CampusResult;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> CampusResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_id=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = Arc::new(AppContext::new(config).await?);

    if !ctx.mailer.is_configured() {
        tracing::warn!("Email not configured; verification codes will be generated but not delivered");
    }

    // Start background jobs
    let scheduler = Arc::new(jobs::JobScheduler::new(Arc::clone(&ctx)));
    scheduler.start();

    // Start server
    server::serve((*ctx).clone()).await?;

    Ok(())
}
