/// Background jobs
///
/// Expired one-time credentials are garbage-collected here. This is
/// passive housekeeping: the expiry predicate inside the token engine's
/// consume path is what enforces correctness.
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{error, info};

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: Arc<crate::context::AppContext>,
}

impl JobScheduler {
    pub fn new(context: Arc<crate::context::AppContext>) -> Self {
        Self { context }
    }

    /// Start all background jobs
    pub fn start(self: Arc<Self>) {
        info!("Starting background job scheduler");

        tokio::spawn(Self::expired_credential_cleanup_job(Arc::clone(&self)));
        tokio::spawn(Self::health_check_job(Arc::clone(&self)));

        info!("Background jobs started");
    }

    /// Purge expired one-time credentials (runs every hour)
    async fn expired_credential_cleanup_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;

            match scheduler.context.token_engine.purge_expired().await {
                Ok(count) => {
                    if count > 0 {
                        info!("Purged {} expired one-time credentials", count);
                    }
                }
                Err(e) => error!("Failed to purge expired credentials: {}", e),
            }
        }
    }

    /// Health check job (runs every 5 minutes)
    async fn health_check_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(300));

        loop {
            interval.tick().await;

            match sqlx::query("SELECT 1").execute(&scheduler.context.db).await {
                Ok(_) => {
                    // Silent success
                }
                Err(e) => error!("Health check failed: {}", e),
            }
        }
    }
}
