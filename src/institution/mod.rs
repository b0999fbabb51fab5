/// Institution management
///
/// Tenant CRUD for the superadmin surface. Plain reads and writes; the
/// only invariants are the unique code and the status gate enforced at
/// registration time.
use crate::{
    clock::Clock,
    db::models::{Institution, InstitutionStatus},
    error::{CampusError, CampusResult},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Institution creation request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstitutionRequest {
    #[validate(length(min = 2, message = "Institution name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 3, max = 20, message = "Institution code must be 3-20 characters"))]
    pub code: String,
    pub domain: Option<String>,
    pub status: Option<InstitutionStatus>,
}

/// Public institution listing entry (for the signup dropdown)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionSummary {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// Institution manager service
pub struct InstitutionManager {
    db: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl InstitutionManager {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Create an institution; the code is stored uppercased
    pub async fn create(&self, req: &CreateInstitutionRequest) -> CampusResult<Institution> {
        let code = req.code.to_uppercase();

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM institutions WHERE code = ?1")
            .bind(&code)
            .fetch_one(&self.db)
            .await
            .map_err(CampusError::Database)?;

        if existing > 0 {
            return Err(CampusError::Duplicate(
                "Institution code already exists".to_string(),
            ));
        }

        let now = self.clock.now();
        let institution = Institution {
            id: Uuid::new_v4().to_string(),
            name: req.name.clone(),
            code,
            domain: req.domain.clone(),
            status: req.status.unwrap_or(InstitutionStatus::Active),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO institutions (id, name, code, domain, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&institution.id)
        .bind(&institution.name)
        .bind(&institution.code)
        .bind(&institution.domain)
        .bind(institution.status)
        .bind(institution.created_at)
        .bind(institution.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CampusError::Duplicate("Institution code already exists".to_string())
            }
            _ => CampusError::Database(e),
        })?;

        tracing::info!(code = %institution.code, "Institution created");

        Ok(institution)
    }

    /// List every institution (superadmin view)
    pub async fn list(&self) -> CampusResult<Vec<Institution>> {
        sqlx::query_as::<_, Institution>(
            "SELECT id, name, code, domain, status, created_at, updated_at
             FROM institutions ORDER BY name",
        )
        .fetch_all(&self.db)
        .await
        .map_err(CampusError::Database)
    }

    /// List active institutions for the public signup dropdown
    pub async fn list_active(&self) -> CampusResult<Vec<InstitutionSummary>> {
        let institutions = sqlx::query_as::<_, Institution>(
            "SELECT id, name, code, domain, status, created_at, updated_at
             FROM institutions WHERE status = 'active' ORDER BY name",
        )
        .fetch_all(&self.db)
        .await
        .map_err(CampusError::Database)?;

        Ok(institutions
            .into_iter()
            .map(|i| InstitutionSummary {
                id: i.id,
                name: i.name,
                code: i.code,
            })
            .collect())
    }

    /// Update an institution's status by code
    pub async fn set_status(&self, code: &str, status: InstitutionStatus) -> CampusResult<()> {
        let result =
            sqlx::query("UPDATE institutions SET status = ?1, updated_at = ?2 WHERE code = ?3")
                .bind(status)
                .bind(self.clock.now())
                .bind(code.to_uppercase())
                .execute(&self.db)
                .await
                .map_err(CampusError::Database)?;

        if result.rows_affected() == 0 {
            return Err(CampusError::NotFound("Institution not found".to_string()));
        }

        Ok(())
    }
}
