/// Configuration management for the Campus ID service
use crate::error::{CampusError, CampusResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub email: Option<EmailConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public base URL embedded in verification links
    pub public_url: String,
    /// Frontend URL the verify-email page redirects to
    pub frontend_url: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret for access tokens (24 h lifetime)
    pub access_secret: String,
    /// Independent secret for refresh tokens (7 d lifetime)
    pub refresh_secret: String,
    /// API key guarding the superadmin institution endpoints
    pub super_admin_key: String,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> CampusResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("CAMPUS_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("CAMPUS_PORT")
            .unwrap_or_else(|_| "8787".to_string())
            .parse()
            .map_err(|_| CampusError::Validation("Invalid port number".to_string()))?;

        let public_url = env::var("CAMPUS_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));
        let frontend_url =
            env::var("CAMPUS_FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let data_directory: PathBuf = env::var("CAMPUS_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("CAMPUS_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("campus.sqlite"));

        let access_secret = env::var("CAMPUS_JWT_ACCESS_SECRET")
            .map_err(|_| CampusError::Validation("Access token secret required".to_string()))?;
        let refresh_secret = env::var("CAMPUS_JWT_REFRESH_SECRET")
            .map_err(|_| CampusError::Validation("Refresh token secret required".to_string()))?;
        let super_admin_key = env::var("CAMPUS_SUPER_ADMIN_KEY")
            .map_err(|_| CampusError::Validation("Super admin key required".to_string()))?;

        let email = if let Ok(smtp_url) = env::var("CAMPUS_EMAIL_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("CAMPUS_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
            })
        } else {
            None
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                frontend_url,
            },
            storage: StorageConfig {
                data_directory,
                database,
            },
            authentication: AuthConfig {
                access_secret,
                refresh_secret,
                super_admin_key,
            },
            email,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> CampusResult<()> {
        if self.service.hostname.is_empty() {
            return Err(CampusError::Validation(
                "Hostname cannot be empty".to_string(),
            ));
        }

        if self.authentication.access_secret.len() < 32 {
            return Err(CampusError::Validation(
                "Access token secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.refresh_secret.len() < 32 {
            return Err(CampusError::Validation(
                "Refresh token secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.access_secret == self.authentication.refresh_secret {
            return Err(CampusError::Validation(
                "Access and refresh secrets must differ".to_string(),
            ));
        }

        Ok(())
    }
}
