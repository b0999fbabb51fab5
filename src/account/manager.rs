/// Account lifecycle orchestrator
///
/// Composes the token engine, password policy, session issuer, and mailer
/// to drive account state transitions: provisioning → email verification →
/// active, plus login, password change/reset, and session refresh.
use crate::{
    account::{
        AccountSummary, AdminRegisterRequest, AdminRegistered, AuthUser, CreateLecturerRequest,
        CreateStudentRequest, DashboardStats, LoginResponse, ProvisionedAccount, RosterEntry,
        UpdateProfileRequest,
    },
    clock::Clock,
    db::models::{encode_history, Account, AccountStatus, Institution, Role, TokenPurpose},
    error::{CampusError, CampusResult},
    mailer::Mailer,
    otp::{CodeKind, TokenEngine},
    password,
    session::{SessionIssuer, SessionPair},
};
use rand::Rng;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

const MAX_ADMINS_PER_INSTITUTION: i64 = 10;

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, password_history, role, institution_id, \
     status, email_verified, is_first_login, first_name, last_name, student_id, lecturer_id, \
     department, year, lecturer_title, specialization, admin_title, avatar, phone, address, \
     created_at, updated_at";

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    tokens: Arc<TokenEngine>,
    sessions: SessionIssuer,
    mailer: Arc<Mailer>,
    clock: Arc<dyn Clock>,
    /// Public base URL embedded in activation links
    base_url: String,
}

impl AccountManager {
    pub fn new(
        db: SqlitePool,
        tokens: Arc<TokenEngine>,
        sessions: SessionIssuer,
        mailer: Arc<Mailer>,
        clock: Arc<dyn Clock>,
        base_url: String,
    ) -> Self {
        Self {
            db,
            tokens,
            sessions,
            mailer,
            clock,
            base_url,
        }
    }

    // ==================== Registration & provisioning ====================

    /// Self-registration of an institution admin
    ///
    /// The institution must already exist and be active; each institution
    /// is capped at 10 admin accounts. The new account starts pending and
    /// unverified with an OTP emailed for verification.
    pub async fn register_admin(&self, req: &AdminRegisterRequest) -> CampusResult<AdminRegistered> {
        if req.password != req.confirm_password {
            return Err(CampusError::Validation("Passwords don't match".to_string()));
        }

        let code = req.institution_code.to_uppercase();
        let institution = self
            .find_active_institution_by_code(&code)
            .await?
            .ok_or_else(|| {
                CampusError::NotFound("Institution not found or inactive".to_string())
            })?;

        let admin_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM accounts WHERE institution_id = ?1 AND role = ?2",
        )
        .bind(&institution.id)
        .bind(Role::Admin)
        .fetch_one(&self.db)
        .await
        .map_err(CampusError::Database)?;

        if admin_count >= MAX_ADMINS_PER_INSTITUTION {
            return Err(CampusError::Validation(
                "This institution has reached the maximum number of admins (10)".to_string(),
            ));
        }

        if self.email_exists(&req.admin_email).await? {
            return Err(CampusError::Duplicate("Email already registered".to_string()));
        }

        let password_hash = password::hash(&req.password).await?;
        let now = self.clock.now();

        let account = Account {
            id: Uuid::new_v4().to_string(),
            email: req.admin_email.clone(),
            password_hash,
            password_history: "[]".to_string(),
            role: Role::Admin,
            institution_id: institution.id.clone(),
            status: AccountStatus::Pending,
            email_verified: false,
            is_first_login: false,
            first_name: req.admin_first_name.clone(),
            last_name: req.admin_last_name.clone(),
            student_id: None,
            lecturer_id: None,
            department: None,
            year: None,
            lecturer_title: None,
            specialization: None,
            admin_title: Some("Institution Administrator".to_string()),
            avatar: Some(initials(&req.admin_first_name, &req.admin_last_name)),
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        };

        self.insert_account(&account).await?;

        // Verification OTP; delivery is best-effort by design
        let otp = self
            .tokens
            .issue(&account.email, TokenPurpose::EmailVerification, CodeKind::Otp)
            .await?;
        self.send_otp_in_background(&account.email, &otp, TokenPurpose::EmailVerification);

        tracing::info!(
            email = %account.email,
            institution = %institution.code,
            "Admin account registered, pending verification"
        );

        Ok(AdminRegistered {
            admin_id: account.id,
            email: account.email,
            institution_name: institution.name,
            institution_code: institution.code,
        })
    }

    /// Provision a student account (admin only)
    ///
    /// Default password is lowercase(firstName) + "123"; the account starts
    /// pending, unverified, with the first-login flag set, and a 24-hour
    /// magic-link activation token is emailed.
    pub async fn provision_student(
        &self,
        admin_id: &str,
        req: &CreateStudentRequest,
    ) -> CampusResult<ProvisionedAccount> {
        let institution = self.institution_of_admin(admin_id).await?;
        let student_id = self.generate_role_identifier(&institution.code, None);

        self.provision(
            req.email.clone(),
            Role::Student,
            &institution,
            &req.first_name,
            &req.last_name,
            ProfileFields {
                student_id: Some(student_id),
                department: Some(req.department.clone()),
                year: Some(req.year.clone()),
                ..Default::default()
            },
        )
        .await
    }

    /// Provision a lecturer account (admin only)
    pub async fn provision_lecturer(
        &self,
        admin_id: &str,
        req: &CreateLecturerRequest,
    ) -> CampusResult<ProvisionedAccount> {
        let institution = self.institution_of_admin(admin_id).await?;
        let lecturer_id = self.generate_role_identifier(&institution.code, Some("LEC"));

        self.provision(
            req.email.clone(),
            Role::Lecturer,
            &institution,
            &req.first_name,
            &req.last_name,
            ProfileFields {
                lecturer_id: Some(lecturer_id),
                department: Some(req.department.clone()),
                lecturer_title: Some(req.title.clone()),
                specialization: Some(req.specialization.clone().unwrap_or_default()),
                ..Default::default()
            },
        )
        .await
    }

    /// Shared provisioning path for students and lecturers
    async fn provision(
        &self,
        email: String,
        role: Role,
        institution: &Institution,
        first_name: &str,
        last_name: &str,
        fields: ProfileFields,
    ) -> CampusResult<ProvisionedAccount> {
        if self.email_exists(&email).await? {
            return Err(CampusError::Duplicate("Email already registered".to_string()));
        }

        let default_password = format!("{}123", first_name.to_lowercase());
        let password_hash = password::hash(&default_password).await?;
        let now = self.clock.now();

        let account = Account {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash,
            password_history: "[]".to_string(),
            role,
            institution_id: institution.id.clone(),
            status: AccountStatus::Pending,
            email_verified: false,
            is_first_login: true,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            student_id: fields.student_id,
            lecturer_id: fields.lecturer_id,
            department: fields.department,
            year: fields.year,
            lecturer_title: fields.lecturer_title,
            specialization: fields.specialization,
            admin_title: None,
            avatar: Some(initials(first_name, last_name)),
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        };

        self.insert_account(&account).await?;

        let role_identifier = account
            .role_identifier()
            .unwrap_or_default()
            .to_string();

        // 24-hour magic-link activation token; the account creation does
        // not depend on mail delivery
        let token = self
            .tokens
            .issue(&email, TokenPurpose::EmailVerification, CodeKind::MagicLink)
            .await?;

        let mailer = Arc::clone(&self.mailer);
        let base_url = self.base_url.clone();
        let institution_name = institution.name.clone();
        let ctx = (
            email.clone(),
            account.first_name.clone(),
            account.last_name.clone(),
            role_identifier.clone(),
            default_password.clone(),
        );
        tokio::spawn(async move {
            let (email, first_name, last_name, role_identifier, default_password) = ctx;
            if let Err(e) = mailer
                .send_activation_email(
                    &email,
                    &first_name,
                    &last_name,
                    &role_identifier,
                    &default_password,
                    &token,
                    &institution_name,
                    &base_url,
                )
                .await
            {
                tracing::warn!("Failed to send activation email to {}: {}", email, e);
            }
        });

        tracing::info!(
            email = %account.email,
            role = role.as_str(),
            institution = %institution.code,
            "Provisioned account, activation email queued"
        );

        Ok(ProvisionedAccount {
            id: account.id,
            email: account.email,
            role_identifier,
            first_name: account.first_name,
            last_name: account.last_name,
            status: account.status.as_str().to_string(),
            default_password,
        })
    }

    // ==================== Login & sessions ====================

    /// Authenticate and mint a session pair
    ///
    /// The precondition order is load-bearing for error semantics:
    /// (1) lookup and (2) password verification both collapse to
    /// InvalidCredentials so callers cannot probe which emails exist;
    /// (3) unverified email is a distinct signal; (4) status gate last.
    pub async fn login(
        &self,
        identifier: &str,
        plaintext: &str,
        role: Role,
    ) -> CampusResult<LoginResponse> {
        let account = match self.find_for_login(identifier, role).await? {
            Some(account) => account,
            None => return Err(CampusError::InvalidCredentials),
        };

        if !password::verify(plaintext, &account.password_hash).await? {
            return Err(CampusError::InvalidCredentials);
        }

        if !account.email_verified {
            return Err(CampusError::VerificationRequired {
                email: account.email,
            });
        }

        if account.status != AccountStatus::Active {
            return Err(CampusError::AccountNotActive);
        }

        let pair = self.sessions.issue_pair(
            &account.id,
            account.role,
            &account.institution_id,
            &account.email,
            self.clock.now(),
        )?;

        let institution_name = self.institution_name(&account.institution_id).await?;

        tracing::info!(email = %account.email, role = role.as_str(), "Login successful");

        Ok(LoginResponse {
            user: summarize(&account, institution_name),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }

    /// Exchange a refresh token for a fresh pair
    ///
    /// Claims are re-derived from the account's current role, institution,
    /// and email, so a role change takes effect at the next refresh.
    pub async fn refresh_session(&self, refresh_token: &str) -> CampusResult<SessionPair> {
        let claims = self.sessions.verify_refresh(refresh_token)?;
        let account = self.get_account(&claims.sub).await?;

        self.sessions.issue_pair(
            &account.id,
            account.role,
            &account.institution_id,
            &account.email,
            self.clock.now(),
        )
    }

    /// Resolve a bearer access token to an identity
    ///
    /// Re-checks that the account is still active and verified; any
    /// failure collapses to InvalidToken.
    pub async fn validate_access(&self, token: &str) -> CampusResult<AuthUser> {
        let claims = self.sessions.verify_access(token)?;

        let account = self
            .get_account(&claims.sub)
            .await
            .map_err(|_| CampusError::InvalidToken)?;

        if account.status != AccountStatus::Active || !account.email_verified {
            return Err(CampusError::InvalidToken);
        }

        Ok(AuthUser {
            account_id: claims.sub,
            role: claims.role,
            institution_id: claims.institution_id,
            email: claims.email,
        })
    }

    // ==================== Verification ====================

    /// Consume a magic-link verification token and activate the account
    pub async fn verify_email_token(&self, email: &str, token: &str) -> CampusResult<()> {
        self.tokens
            .consume(email, token, TokenPurpose::EmailVerification)
            .await?;
        self.activate(email).await
    }

    /// Consume a 6-digit verification OTP and activate the account
    pub async fn verify_otp(&self, email: &str, code: &str) -> CampusResult<()> {
        self.tokens
            .consume(email, code, TokenPurpose::EmailVerification)
            .await?;
        self.activate(email).await
    }

    /// Re-issue a verification OTP for an existing account
    pub async fn resend_verification(&self, email: &str) -> CampusResult<()> {
        if !self.email_exists(email).await? {
            return Err(CampusError::NotFound("User not found".to_string()));
        }

        let otp = self
            .tokens
            .issue(email, TokenPurpose::EmailVerification, CodeKind::Otp)
            .await?;
        self.send_otp_in_background(email, &otp, TokenPurpose::EmailVerification);

        Ok(())
    }

    /// Flip an account to active + verified
    async fn activate(&self, email: &str) -> CampusResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET email_verified = 1, status = 'active', updated_at = ?1
             WHERE email = ?2",
        )
        .bind(self.clock.now())
        .bind(email)
        .execute(&self.db)
        .await
        .map_err(CampusError::Database)?;

        if result.rows_affected() == 0 {
            return Err(CampusError::NotFound("User not found".to_string()));
        }

        tracing::info!(email, "Email verified, account activated");
        Ok(())
    }

    // ==================== Password lifecycle ====================

    /// Start a password reset
    ///
    /// Deliberately silent about whether the account exists: the handler
    /// returns the same generic message either way. The issued code is
    /// returned for tests only; production callers ignore it.
    pub async fn forgot_password(&self, email: &str, role: Role) -> CampusResult<Option<String>> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM accounts WHERE email = ?1 AND role = ?2",
        )
        .bind(email)
        .bind(role)
        .fetch_one(&self.db)
        .await
        .map_err(CampusError::Database)?;

        if exists == 0 {
            tracing::debug!(email, "Password reset requested for unknown account");
            return Ok(None);
        }

        let otp = self
            .tokens
            .issue(email, TokenPurpose::PasswordReset, CodeKind::Otp)
            .await?;
        self.send_otp_in_background(email, &otp, TokenPurpose::PasswordReset);

        Ok(Some(otp))
    }

    /// Complete a password reset with an emailed OTP
    ///
    /// Does not require any prior login state and leaves the first-login
    /// flag untouched.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> CampusResult<()> {
        self.tokens
            .consume(email, code, TokenPurpose::PasswordReset)
            .await?;

        let account = self
            .get_account_by_email(email)
            .await?
            .ok_or_else(|| CampusError::NotFound("User not found".to_string()))?;

        self.commit_new_password(&account, new_password, false).await
    }

    /// Authenticated password change; clears the first-login flag
    pub async fn change_password(
        &self,
        account_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> CampusResult<()> {
        let account = self.get_account(account_id).await?;

        if !password::verify(current_password, &account.password_hash).await? {
            return Err(CampusError::Validation(
                "The current password you entered is incorrect".to_string(),
            ));
        }

        self.commit_new_password(&account, new_password, true).await
    }

    /// Reuse checks, history rotation, and the guarded write
    ///
    /// The UPDATE is conditional on the password hash read at the start of
    /// the operation; a concurrent change loses the race and reports
    /// Conflict instead of committing a divergent history.
    async fn commit_new_password(
        &self,
        account: &Account,
        new_password: &str,
        clear_first_login: bool,
    ) -> CampusResult<()> {
        let history = account.history();

        if let Some(rejection) =
            password::check_reuse(new_password, &account.password_hash, &history).await?
        {
            return Err(CampusError::PolicyViolation(rejection.message().to_string()));
        }

        let new_hash = password::hash(new_password).await?;
        let rotated = password::rotate_history(&history, &account.password_hash);
        let now = self.clock.now();

        let sql = if clear_first_login {
            "UPDATE accounts SET password_hash = ?1, password_history = ?2, updated_at = ?3,
                 is_first_login = 0
             WHERE id = ?4 AND password_hash = ?5"
        } else {
            "UPDATE accounts SET password_hash = ?1, password_history = ?2, updated_at = ?3
             WHERE id = ?4 AND password_hash = ?5"
        };

        let result = sqlx::query(sql)
            .bind(&new_hash)
            .bind(encode_history(&rotated))
            .bind(now)
            .bind(&account.id)
            .bind(&account.password_hash)
            .execute(&self.db)
            .await
            .map_err(CampusError::Database)?;

        if result.rows_affected() == 0 {
            return Err(CampusError::Conflict(
                "Password was changed concurrently, please retry".to_string(),
            ));
        }

        tracing::info!(email = %account.email, "Password updated");
        Ok(())
    }

    // ==================== Status & profile ====================

    /// Manual status override (suspension and reactivation)
    pub async fn set_status(&self, account_id: &str, status: AccountStatus) -> CampusResult<()> {
        let result = sqlx::query("UPDATE accounts SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(self.clock.now())
            .bind(account_id)
            .execute(&self.db)
            .await
            .map_err(CampusError::Database)?;

        if result.rows_affected() == 0 {
            return Err(CampusError::NotFound("User not found".to_string()));
        }

        tracing::info!(account_id, status = status.as_str(), "Account status updated");
        Ok(())
    }

    /// Partial profile update
    pub async fn update_profile(
        &self,
        account_id: &str,
        req: &UpdateProfileRequest,
    ) -> CampusResult<Account> {
        let mut account = self.get_account(account_id).await?;

        if let Some(first_name) = &req.first_name {
            account.first_name = first_name.clone();
        }
        if let Some(last_name) = &req.last_name {
            account.last_name = last_name.clone();
        }
        if req.phone.is_some() {
            account.phone = req.phone.clone();
        }
        if req.address.is_some() {
            account.address = req.address.clone();
        }
        if req.department.is_some() {
            account.department = req.department.clone();
        }
        if req.year.is_some() {
            account.year = req.year.clone();
        }
        account.updated_at = self.clock.now();

        sqlx::query(
            "UPDATE accounts SET first_name = ?1, last_name = ?2, phone = ?3, address = ?4,
                 department = ?5, year = ?6, updated_at = ?7
             WHERE id = ?8",
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.phone)
        .bind(&account.address)
        .bind(&account.department)
        .bind(&account.year)
        .bind(account.updated_at)
        .bind(&account.id)
        .execute(&self.db)
        .await
        .map_err(CampusError::Database)?;

        Ok(account)
    }

    /// Profile summary with the institution name resolved
    pub async fn profile(&self, account_id: &str) -> CampusResult<AccountSummary> {
        let account = self.get_account(account_id).await?;
        let institution_name = self.institution_name(&account.institution_id).await?;
        Ok(summarize(&account, institution_name))
    }

    // ==================== Reads ====================

    /// Get account by id
    pub async fn get_account(&self, account_id: &str) -> CampusResult<Account> {
        let sql = format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, Account>(&sql)
            .bind(account_id)
            .fetch_optional(&self.db)
            .await
            .map_err(CampusError::Database)?
            .ok_or_else(|| CampusError::NotFound("User not found".to_string()))
    }

    /// Get account by email
    pub async fn get_account_by_email(&self, email: &str) -> CampusResult<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE email = ?1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(CampusError::Database)
    }

    /// Find an account for login: admins by email only, students and
    /// lecturers by email or their role identifier
    async fn find_for_login(&self, identifier: &str, role: Role) -> CampusResult<Option<Account>> {
        let sql = match role {
            Role::Admin => format!(
                "SELECT {} FROM accounts WHERE email = ?1 AND role = ?2",
                ACCOUNT_COLUMNS
            ),
            Role::Student => format!(
                "SELECT {} FROM accounts WHERE (email = ?1 OR student_id = ?1) AND role = ?2",
                ACCOUNT_COLUMNS
            ),
            Role::Lecturer => format!(
                "SELECT {} FROM accounts WHERE (email = ?1 OR lecturer_id = ?1) AND role = ?2",
                ACCOUNT_COLUMNS
            ),
        };

        sqlx::query_as::<_, Account>(&sql)
            .bind(identifier)
            .bind(role)
            .fetch_optional(&self.db)
            .await
            .map_err(CampusError::Database)
    }

    /// List students or lecturers of an institution, without credential
    /// material
    pub async fn roster(&self, institution_id: &str, role: Role) -> CampusResult<Vec<RosterEntry>> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE institution_id = ?1 AND role = ?2 ORDER BY created_at",
            ACCOUNT_COLUMNS
        );
        let accounts = sqlx::query_as::<_, Account>(&sql)
            .bind(institution_id)
            .bind(role)
            .fetch_all(&self.db)
            .await
            .map_err(CampusError::Database)?;

        Ok(accounts
            .into_iter()
            .map(|a| RosterEntry {
                id: a.id,
                email: a.email,
                student_id: a.student_id,
                lecturer_id: a.lecturer_id,
                first_name: a.first_name,
                last_name: a.last_name,
                department: a.department,
                year: a.year,
                title: a.lecturer_title,
                specialization: a.specialization,
                status: a.status.as_str().to_string(),
                email_verified: a.email_verified,
            })
            .collect())
    }

    /// Dashboard counts for an institution
    pub async fn dashboard_stats(&self, institution_id: &str) -> CampusResult<DashboardStats> {
        let count = |filter_sql: &'static str, value: &'static str| {
            let sql = format!(
                "SELECT COUNT(*) FROM accounts WHERE institution_id = ?1 AND {} = ?2",
                filter_sql
            );
            let db = self.db.clone();
            let institution_id = institution_id.to_string();
            async move {
                sqlx::query_scalar::<_, i64>(&sql)
                    .bind(&institution_id)
                    .bind(value)
                    .fetch_one(&db)
                    .await
                    .map_err(CampusError::Database)
            }
        };

        Ok(DashboardStats {
            students: count("role", "student").await?,
            lecturers: count("role", "lecturer").await?,
            admins: count("role", "admin").await?,
            active: count("status", "active").await?,
            pending: count("status", "pending").await?,
            suspended: count("status", "suspended").await?,
        })
    }

    // ==================== Internals ====================

    async fn email_exists(&self, email: &str) -> CampusResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .map_err(CampusError::Database)?;

        Ok(count > 0)
    }

    async fn insert_account(&self, account: &Account) -> CampusResult<()> {
        sqlx::query(
            "INSERT INTO accounts (id, email, password_hash, password_history, role,
                 institution_id, status, email_verified, is_first_login, first_name, last_name,
                 student_id, lecturer_id, department, year, lecturer_title, specialization,
                 admin_title, avatar, phone, address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                 ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.password_history)
        .bind(account.role)
        .bind(&account.institution_id)
        .bind(account.status)
        .bind(account.email_verified)
        .bind(account.is_first_login)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.student_id)
        .bind(&account.lecturer_id)
        .bind(&account.department)
        .bind(&account.year)
        .bind(&account.lecturer_title)
        .bind(&account.specialization)
        .bind(&account.admin_title)
        .bind(&account.avatar)
        .bind(&account.phone)
        .bind(&account.address)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CampusError::Duplicate("Email already registered".to_string())
            }
            _ => CampusError::Database(e),
        })?;

        Ok(())
    }

    async fn find_active_institution_by_code(
        &self,
        code: &str,
    ) -> CampusResult<Option<Institution>> {
        sqlx::query_as::<_, Institution>(
            "SELECT id, name, code, domain, status, created_at, updated_at
             FROM institutions WHERE code = ?1 AND status = 'active'",
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await
        .map_err(CampusError::Database)
    }

    async fn institution_of_admin(&self, admin_id: &str) -> CampusResult<Institution> {
        let admin = self.get_account(admin_id).await?;

        sqlx::query_as::<_, Institution>(
            "SELECT id, name, code, domain, status, created_at, updated_at
             FROM institutions WHERE id = ?1",
        )
        .bind(&admin.institution_id)
        .fetch_optional(&self.db)
        .await
        .map_err(CampusError::Database)?
        .ok_or_else(|| CampusError::NotFound("Institution not found".to_string()))
    }

    async fn institution_name(&self, institution_id: &str) -> CampusResult<String> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT name FROM institutions WHERE id = ?1")
                .bind(institution_id)
                .fetch_optional(&self.db)
                .await
                .map_err(CampusError::Database)?;

        Ok(name.unwrap_or_else(|| "Unknown Institution".to_string()))
    }

    /// Campus card identifier: CODE-<6 timestamp digits><3 random digits>,
    /// lecturers get a LEC infix
    fn generate_role_identifier(&self, institution_code: &str, infix: Option<&str>) -> String {
        let millis = self.clock.now().timestamp_millis().to_string();
        let tail = &millis[millis.len().saturating_sub(6)..];
        let suffix: u32 = rand::thread_rng().gen_range(0..1000);

        match infix {
            Some(infix) => format!("{}-{}-{}{:03}", institution_code, infix, tail, suffix),
            None => format!("{}-{}{:03}", institution_code, tail, suffix),
        }
    }

    fn send_otp_in_background(&self, email: &str, code: &str, purpose: TokenPurpose) {
        let mailer = Arc::clone(&self.mailer);
        let email = email.to_string();
        let code = code.to_string();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_otp_email(&email, &code, purpose).await {
                tracing::warn!(
                    "Failed to send {} email to {}: {}",
                    purpose.as_db_str(),
                    email,
                    e
                );
            }
        });
    }
}

/// Optional profile columns set at provisioning time
#[derive(Default)]
struct ProfileFields {
    student_id: Option<String>,
    lecturer_id: Option<String>,
    department: Option<String>,
    year: Option<String>,
    lecturer_title: Option<String>,
    specialization: Option<String>,
}

fn initials(first_name: &str, last_name: &str) -> String {
    let mut initials = String::new();
    initials.extend(first_name.chars().next());
    initials.extend(last_name.chars().next());
    initials.to_uppercase()
}

fn summarize(account: &Account, institution_name: String) -> AccountSummary {
    AccountSummary {
        id: account.id.clone(),
        email: account.email.clone(),
        user_type: account.role,
        name: format!("{} {}", account.first_name, account.last_name),
        avatar: account.avatar.clone(),
        student_id: account.student_id.clone(),
        lecturer_id: account.lecturer_id.clone(),
        institution_id: account.institution_id.clone(),
        institution_name,
        is_first_login: account.is_first_login,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_clock::ManualClock;
    use chrono::{Duration, Utc};
    use sqlx::Row;

    const ACCESS_SECRET: &str = "access-secret-for-tests-0123456789ab";
    const REFRESH_SECRET: &str = "refresh-secret-for-tests-0123456789a";

    async fn setup_db() -> SqlitePool {
        let db = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE institutions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                code TEXT NOT NULL UNIQUE,
                domain TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                password_history TEXT NOT NULL DEFAULT '[]',
                role TEXT NOT NULL,
                institution_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                email_verified BOOLEAN NOT NULL DEFAULT 0,
                is_first_login BOOLEAN NOT NULL DEFAULT 0,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                student_id TEXT,
                lecturer_id TEXT,
                department TEXT,
                year TEXT,
                lecturer_title TEXT,
                specialization TEXT,
                admin_title TEXT,
                avatar TEXT,
                phone TEXT,
                address TEXT,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE one_time_credentials (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                code TEXT NOT NULL,
                purpose TEXT NOT NULL,
                expires_at DATETIME NOT NULL,
                used BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        db
    }

    async fn create_test_manager() -> (AccountManager, Arc<ManualClock>, SqlitePool) {
        let db = setup_db().await;
        let clock = ManualClock::new(Utc::now());
        let tokens = Arc::new(TokenEngine::new(db.clone(), clock.clone()));
        let sessions = SessionIssuer::new(ACCESS_SECRET.to_string(), REFRESH_SECRET.to_string());
        let mailer = Arc::new(Mailer::new(None).unwrap());

        let manager = AccountManager::new(
            db.clone(),
            tokens,
            sessions,
            mailer,
            clock.clone(),
            "http://localhost:8787".to_string(),
        );

        (manager, clock, db)
    }

    async fn insert_institution(db: &SqlitePool, name: &str, code: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO institutions (id, name, code, domain, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, NULL, 'active', ?4, ?5)",
        )
        .bind(&id)
        .bind(name)
        .bind(code)
        .bind(now)
        .bind(now)
        .execute(db)
        .await
        .unwrap();
        id
    }

    /// Provision a student under a fresh MIT institution and admin
    async fn provision_test_student(
        manager: &AccountManager,
        db: &SqlitePool,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> ProvisionedAccount {
        let institution_id = insert_institution(db, "MIT", "MIT").await;
        let admin_id = insert_test_admin(db, &institution_id).await;

        manager
            .provision_student(
                &admin_id,
                &CreateStudentRequest {
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    email: email.to_string(),
                    department: "Mathematics".to_string(),
                    year: "1".to_string(),
                },
            )
            .await
            .unwrap()
    }

    async fn insert_test_admin(db: &SqlitePool, institution_id: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO accounts (id, email, password_hash, password_history, role,
                 institution_id, status, email_verified, is_first_login, first_name, last_name,
                 created_at, updated_at)
             VALUES (?1, ?2, 'hash', '[]', 'admin', ?3, 'active', 1, 0, 'Admin', 'User', ?4, ?5)",
        )
        .bind(&id)
        .bind(format!("admin-{}@uni.edu", &id[..8]))
        .bind(institution_id)
        .bind(now)
        .bind(now)
        .execute(db)
        .await
        .unwrap();

        id
    }

    /// Fetch the latest unused one-time credential for (email, purpose)
    async fn latest_code(db: &SqlitePool, email: &str, purpose: &str) -> String {
        sqlx::query(
            "SELECT code FROM one_time_credentials
             WHERE email = ?1 AND purpose = ?2 AND used = 0
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(email)
        .bind(purpose)
        .fetch_one(db)
        .await
        .unwrap()
        .get("code")
    }

    #[tokio::test]
    async fn provision_student_scenario() {
        let (manager, _clock, db) = create_test_manager().await;

        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;

        assert_eq!(provisioned.default_password, "ada123");
        assert_eq!(provisioned.status, "pending");
        assert!(provisioned.role_identifier.starts_with("MIT-"));

        let account = manager.get_account(&provisioned.id).await.unwrap();
        assert_eq!(account.status, AccountStatus::Pending);
        assert!(!account.email_verified);
        assert!(account.is_first_login);
        assert_eq!(account.avatar.as_deref(), Some("AL"));

        // Consume the emailed magic-link token
        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        assert_eq!(token.len(), 32);
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();

        let account = manager.get_account(&provisioned.id).await.unwrap();
        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.email_verified);
    }

    #[tokio::test]
    async fn provision_lecturer_gets_lec_identifier() {
        let (manager, _clock, db) = create_test_manager().await;
        let institution_id = insert_institution(&db, "MIT", "MIT").await;
        let admin_id = insert_test_admin(&db, &institution_id).await;

        let provisioned = manager
            .provision_lecturer(
                &admin_id,
                &CreateLecturerRequest {
                    first_name: "Grace".to_string(),
                    last_name: "Hopper".to_string(),
                    email: "grace@mit.edu".to_string(),
                    department: "Computer Science".to_string(),
                    title: "Prof".to_string(),
                    specialization: Some("Compilers".to_string()),
                },
            )
            .await
            .unwrap();

        assert!(provisioned.role_identifier.starts_with("MIT-LEC-"));
        assert_eq!(provisioned.default_password, "grace123");
    }

    #[tokio::test]
    async fn provision_rejects_duplicate_email() {
        let (manager, _clock, db) = create_test_manager().await;
        let institution_id = insert_institution(&db, "MIT", "MIT").await;
        let admin_id = insert_test_admin(&db, &institution_id).await;

        let req = CreateStudentRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@mit.edu".to_string(),
            department: "Mathematics".to_string(),
            year: "1".to_string(),
        };

        manager.provision_student(&admin_id, &req).await.unwrap();
        let result = manager.provision_student(&admin_id, &req).await;
        assert!(matches!(result, Err(CampusError::Duplicate(_))));
    }

    #[tokio::test]
    async fn login_precondition_order() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;

        // Wrong password and nonexistent account collapse to the same error
        let wrong_password = manager
            .login("ada@mit.edu", "not-the-password", Role::Student)
            .await;
        let no_such_user = manager
            .login("ghost@mit.edu", "ada123", Role::Student)
            .await;
        assert!(matches!(wrong_password, Err(CampusError::InvalidCredentials)));
        assert!(matches!(no_such_user, Err(CampusError::InvalidCredentials)));

        // Correct password on an unverified account is the distinct signal
        let unverified = manager.login("ada@mit.edu", "ada123", Role::Student).await;
        match unverified {
            Err(CampusError::VerificationRequired { email }) => {
                assert_eq!(email, "ada@mit.edu");
            }
            other => panic!("Expected VerificationRequired, got {:?}", other.map(|_| ())),
        }

        // Verified but suspended accounts are blocked by the status gate
        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();
        manager
            .set_status(&provisioned.id, AccountStatus::Suspended)
            .await
            .unwrap();

        let suspended = manager.login("ada@mit.edu", "ada123", Role::Student).await;
        assert!(matches!(suspended, Err(CampusError::AccountNotActive)));

        // Reactivated: login succeeds and reports the first-login flag
        manager
            .set_status(&provisioned.id, AccountStatus::Active)
            .await
            .unwrap();
        let response = manager
            .login("ada@mit.edu", "ada123", Role::Student)
            .await
            .unwrap();
        assert!(response.user.is_first_login);
        assert_eq!(response.user.institution_name, "MIT");
    }

    #[tokio::test]
    async fn login_accepts_role_identifier() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;

        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();

        // Student ID works as the login identifier
        let response = manager
            .login(&provisioned.role_identifier, "ada123", Role::Student)
            .await
            .unwrap();
        assert_eq!(response.user.email, "ada@mit.edu");

        // But only for the matching role
        let as_admin = manager
            .login(&provisioned.role_identifier, "ada123", Role::Admin)
            .await;
        assert!(matches!(as_admin, Err(CampusError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn change_password_clears_first_login_and_rotates_history() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;
        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();

        // Wrong current password is rejected with field-level detail
        let wrong_current = manager
            .change_password(&provisioned.id, "nope", "fresh-password-1")
            .await;
        assert!(matches!(wrong_current, Err(CampusError::Validation(_))));

        manager
            .change_password(&provisioned.id, "ada123", "fresh-password-1")
            .await
            .unwrap();

        let account = manager.get_account(&provisioned.id).await.unwrap();
        assert!(!account.is_first_login);
        assert_eq!(account.history().len(), 1);

        // Old password no longer works, new one does
        let old = manager.login("ada@mit.edu", "ada123", Role::Student).await;
        assert!(matches!(old, Err(CampusError::InvalidCredentials)));
        manager
            .login("ada@mit.edu", "fresh-password-1", Role::Student)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn password_reuse_is_rejected() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;
        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();

        // Same as current
        let same = manager
            .change_password(&provisioned.id, "ada123", "ada123")
            .await;
        assert!(matches!(same, Err(CampusError::PolicyViolation(_))));

        // Rotate once, then try to come back to the provisioned default
        manager
            .change_password(&provisioned.id, "ada123", "fresh-password-1")
            .await
            .unwrap();
        let recent = manager
            .change_password(&provisioned.id, "fresh-password-1", "ada123")
            .await;
        assert!(matches!(recent, Err(CampusError::PolicyViolation(_))));

        // Anything outside the retained set is accepted
        manager
            .change_password(&provisioned.id, "fresh-password-1", "fresh-password-2")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn password_history_never_exceeds_five() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;
        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();

        let mut current = "ada123".to_string();
        for i in 0..7 {
            let next = format!("rotation-password-{}", i);
            manager
                .change_password(&provisioned.id, &current, &next)
                .await
                .unwrap();
            current = next;

            let account = manager.get_account(&provisioned.id).await.unwrap();
            assert!(account.history().len() <= 5);
        }

        let account = manager.get_account(&provisioned.id).await.unwrap();
        assert_eq!(account.history().len(), 5);
    }

    #[tokio::test]
    async fn forgot_password_is_silent_for_unknown_accounts() {
        let (manager, _clock, _db) = create_test_manager().await;

        let outcome = manager
            .forgot_password("ghost@mit.edu", Role::Student)
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn reset_password_flow() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;
        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();

        let code = manager
            .forgot_password("ada@mit.edu", Role::Student)
            .await
            .unwrap()
            .expect("known account should get a code");

        manager
            .reset_password("ada@mit.edu", &code, "reset-password-1")
            .await
            .unwrap();

        manager
            .login("ada@mit.edu", "reset-password-1", Role::Student)
            .await
            .unwrap();

        // Reset does not touch the first-login flag
        let account = manager.get_account(&provisioned.id).await.unwrap();
        assert!(account.is_first_login);

        // The code is single-use
        let replay = manager
            .reset_password("ada@mit.edu", &code, "reset-password-2")
            .await;
        assert!(matches!(replay, Err(CampusError::ExpiredOrConsumed)));
    }

    #[tokio::test]
    async fn reissued_reset_code_invalidates_the_first() {
        let (manager, _clock, db) = create_test_manager().await;
        provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;

        let first = manager
            .forgot_password("ada@mit.edu", Role::Student)
            .await
            .unwrap()
            .unwrap();
        let second = manager
            .forgot_password("ada@mit.edu", Role::Student)
            .await
            .unwrap()
            .unwrap();

        let stale = manager
            .reset_password("ada@mit.edu", &first, "reset-password-1")
            .await;
        assert!(matches!(stale, Err(CampusError::ExpiredOrConsumed)));

        manager
            .reset_password("ada@mit.edu", &second, "reset-password-1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reset_code_expires_after_ten_minutes() {
        let (manager, clock, db) = create_test_manager().await;
        provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;

        let code = manager
            .forgot_password("ada@mit.edu", Role::Student)
            .await
            .unwrap()
            .unwrap();

        clock.advance(Duration::minutes(11));

        let expired = manager
            .reset_password("ada@mit.edu", &code, "reset-password-1")
            .await;
        assert!(matches!(expired, Err(CampusError::ExpiredOrConsumed)));
    }

    #[tokio::test]
    async fn refresh_reflects_current_role() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;
        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();

        let response = manager
            .login("ada@mit.edu", "ada123", Role::Student)
            .await
            .unwrap();

        // Role changes after the original login
        sqlx::query("UPDATE accounts SET role = 'lecturer' WHERE id = ?1")
            .bind(&provisioned.id)
            .execute(&db)
            .await
            .unwrap();

        let pair = manager
            .refresh_session(&response.refresh_token)
            .await
            .unwrap();

        let issuer = SessionIssuer::new(ACCESS_SECRET.to_string(), REFRESH_SECRET.to_string());
        let claims = issuer.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.role, Role::Lecturer);
    }

    #[tokio::test]
    async fn refresh_with_garbage_token_fails_closed() {
        let (manager, _clock, _db) = create_test_manager().await;

        let garbage = manager.refresh_session("not-a-jwt").await;
        assert!(matches!(garbage, Err(CampusError::InvalidToken)));

        // A well-formed token for an account that does not exist
        let issuer = SessionIssuer::new(ACCESS_SECRET.to_string(), REFRESH_SECRET.to_string());
        let pair = issuer
            .issue_pair("missing", Role::Student, "inst", "x@y.z", Utc::now())
            .unwrap();
        let missing = manager.refresh_session(&pair.refresh_token).await;
        assert!(matches!(missing, Err(CampusError::NotFound(_))));
    }

    #[tokio::test]
    async fn access_validation_rechecks_account_state() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;
        let token = latest_code(&db, "ada@mit.edu", "email_verification").await;
        manager
            .verify_email_token("ada@mit.edu", &token)
            .await
            .unwrap();

        let response = manager
            .login("ada@mit.edu", "ada123", Role::Student)
            .await
            .unwrap();

        let auth = manager.validate_access(&response.access_token).await.unwrap();
        assert_eq!(auth.email, "ada@mit.edu");
        assert_eq!(auth.role, Role::Student);

        // Suspension invalidates existing bearer tokens at the re-check
        manager
            .set_status(&provisioned.id, AccountStatus::Suspended)
            .await
            .unwrap();
        let suspended = manager.validate_access(&response.access_token).await;
        assert!(matches!(suspended, Err(CampusError::InvalidToken)));
    }

    #[tokio::test]
    async fn register_admin_flow() {
        let (manager, _clock, db) = create_test_manager().await;
        insert_institution(&db, "MIT", "MIT").await;

        let req = AdminRegisterRequest {
            institution_code: "mit".to_string(), // lookup is case-insensitive via uppercase
            admin_first_name: "Alan".to_string(),
            admin_last_name: "Turing".to_string(),
            admin_email: "alan@mit.edu".to_string(),
            password: "enigma-machine".to_string(),
            confirm_password: "enigma-machine".to_string(),
        };

        let registered = manager.register_admin(&req).await.unwrap();
        assert_eq!(registered.institution_name, "MIT");

        // Verify with the emailed OTP and log in
        let code = latest_code(&db, "alan@mit.edu", "email_verification").await;
        assert_eq!(code.len(), 6);
        manager.verify_otp("alan@mit.edu", &code).await.unwrap();

        let response = manager
            .login("alan@mit.edu", "enigma-machine", Role::Admin)
            .await
            .unwrap();
        assert!(!response.user.is_first_login);

        // Duplicate email is rejected
        let duplicate = manager.register_admin(&req).await;
        assert!(matches!(duplicate, Err(CampusError::Duplicate(_))));
    }

    #[tokio::test]
    async fn register_admin_enforces_institution_gates() {
        let (manager, _clock, db) = create_test_manager().await;

        // Unknown institution
        let req = AdminRegisterRequest {
            institution_code: "NOPE".to_string(),
            admin_first_name: "Alan".to_string(),
            admin_last_name: "Turing".to_string(),
            admin_email: "alan@mit.edu".to_string(),
            password: "enigma-machine".to_string(),
            confirm_password: "enigma-machine".to_string(),
        };
        assert!(matches!(
            manager.register_admin(&req).await,
            Err(CampusError::NotFound(_))
        ));

        // Admin cap: fill the institution with 10 admin rows
        let institution_id = insert_institution(&db, "MIT", "MIT").await;
        for _ in 0..10 {
            insert_test_admin(&db, &institution_id).await;
        }
        let req = AdminRegisterRequest {
            institution_code: "MIT".to_string(),
            ..req
        };
        assert!(matches!(
            manager.register_admin(&req).await,
            Err(CampusError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn dashboard_stats_count_by_role_and_status() {
        let (manager, _clock, db) = create_test_manager().await;
        let provisioned =
            provision_test_student(&manager, &db, "Ada", "Lovelace", "ada@mit.edu").await;

        let account = manager.get_account(&provisioned.id).await.unwrap();
        let stats = manager.dashboard_stats(&account.institution_id).await.unwrap();
        assert_eq!(stats.students, 1);
        assert_eq!(stats.admins, 1); // the provisioning admin
        assert_eq!(stats.pending, 1);

        let roster = manager
            .roster(&account.institution_id, Role::Student)
            .await
            .unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].email, "ada@mit.edu");
    }
}
