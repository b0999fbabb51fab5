/// Application context and dependency injection
///
/// Every shared service is constructed here once and passed down
/// explicitly: the store handle opens at process start and is injected
/// into each component rather than accessed as ambient state.
use crate::{
    account::AccountManager,
    clock,
    config::ServerConfig,
    db,
    error::CampusResult,
    institution::InstitutionManager,
    mailer::Mailer,
    otp::TokenEngine,
    session::SessionIssuer,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub institution_manager: Arc<InstitutionManager>,
    pub token_engine: Arc<TokenEngine>,
    pub mailer: Arc<Mailer>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> CampusResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directory if it doesn't exist
        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory).await?;
        }

        // Initialize database
        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let clock = clock::system_clock();

        let token_engine = Arc::new(TokenEngine::new(pool.clone(), Arc::clone(&clock)));
        let sessions = SessionIssuer::new(
            config.authentication.access_secret.clone(),
            config.authentication.refresh_secret.clone(),
        );
        let mailer = Arc::new(Mailer::new(config.email.clone())?);

        let account_manager = Arc::new(AccountManager::new(
            pool.clone(),
            Arc::clone(&token_engine),
            sessions,
            Arc::clone(&mailer),
            Arc::clone(&clock),
            config.service.public_url.clone(),
        ));

        let institution_manager = Arc::new(InstitutionManager::new(pool.clone(), clock));

        Ok(Self {
            config: Arc::new(config),
            db: pool,
            account_manager,
            institution_manager,
            token_engine,
            mailer,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        self.config.service.public_url.clone()
    }
}
