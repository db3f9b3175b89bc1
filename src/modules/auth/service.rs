use anyhow::Context;
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument, warn};

use schoolhouse_auth::create_access_token;
use schoolhouse_config::JwtConfig;
use schoolhouse_core::{AppError, hash_password, verify_password};
use schoolhouse_db::unique_violation;

use crate::metrics;

use super::model::{
    Account, ChangePasswordDto, LoginRequest, LoginResponse, RegisterTeacherDto, Role,
    UpdateProfileDto,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(FromRow)]
struct AccountWithPassword {
    #[sqlx(flatten)]
    account: Account,
    password_hash: String,
}

pub struct AuthService;

impl AuthService {
    /// Creates a TEACHER account. No teacher profile is created here.
    #[instrument(skip(db, dto), fields(account.email = %dto.email))]
    pub async fn register_teacher(
        db: &PgPool,
        dto: RegisterTeacherDto,
    ) -> Result<Account, AppError> {
        if Self::email_exists(db, &dto.email).await? {
            warn!("Registration attempted with existing email");
            return Err(AppError::duplicate(anyhow::anyhow!(
                "User with email already exists: {}",
                dto.email
            )));
        }

        if !dto.passwords_match() {
            return Err(AppError::validation(anyhow::anyhow!(
                "Passwords do not match"
            )));
        }

        let password_hash = hash_password(&dto.password)?;

        let account = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (first_name, last_name, email, password_hash, role, date_of_birth)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, first_name, last_name, email, role, date_of_birth, created_at, updated_at",
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(Role::Teacher)
        .bind(dto.date_of_birth)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                return AppError::duplicate(anyhow::anyhow!(
                    "User with email already exists: {}",
                    dto.email
                ));
            }
            AppError::database(anyhow::Error::new(e).context("Failed to insert account"))
        })?;

        metrics::track_account_registered(Role::Teacher);
        info!(account.id = %account.id, "Teacher account registered");

        Ok(account)
    }

    /// Checks credentials. Unknown email and wrong password fail identically.
    #[instrument(skip(db, password))]
    pub async fn authenticate(
        db: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<Account, AppError> {
        let row = sqlx::query_as::<_, AccountWithPassword>(
            "SELECT id, first_name, last_name, email, role, date_of_birth, created_at, updated_at, password_hash
             FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("Failed to fetch account")
        .map_err(AppError::database)?;

        let Some(row) = row else {
            metrics::track_login_failure();
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        };

        if !verify_password(password, &row.password_hash)? {
            metrics::track_login_failure();
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        }

        Ok(row.account)
    }

    #[instrument(skip(db, dto, jwt_config), fields(account.email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let account = Self::authenticate(db, &dto.email, &dto.password).await?;

        let access_token =
            create_access_token(account.id, &account.email, account.role, jwt_config)?;

        metrics::track_login_success(account.role);
        info!(account.id = %account.id, role = %account.role, "Login successful");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            full_name: account.full_name(),
            email: account.email,
            role: account.role,
        })
    }

    #[instrument(skip(db))]
    pub async fn get_account_by_email(db: &PgPool, email: &str) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            "SELECT id, first_name, last_name, email, role, date_of_birth, created_at, updated_at
             FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("Failed to fetch account")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found with email: {}", email)))
    }

    /// Overwrites the account's names and date of birth.
    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        email: &str,
        dto: UpdateProfileDto,
    ) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts
             SET first_name = $2, last_name = $3, date_of_birth = $4, updated_at = NOW()
             WHERE email = $1
             RETURNING id, first_name, last_name, email, role, date_of_birth, created_at, updated_at",
        )
        .bind(email)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(dto.date_of_birth)
        .fetch_optional(db)
        .await
        .context("Failed to update account")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found with email: {}", email)))
    }

    /// Replaces the password hash. The current password is not asked for.
    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        email: &str,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        if !dto.passwords_match() {
            return Err(AppError::validation(anyhow::anyhow!(
                "Passwords do not match"
            )));
        }

        let password_hash = hash_password(&dto.new_password)?;

        let result = sqlx::query(
            "UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .bind(&password_hash)
        .execute(db)
        .await
        .context("Failed to update password")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "User not found with email: {}",
                email
            )));
        }

        info!("Password changed");
        Ok(())
    }

    async fn email_exists(db: &PgPool, email: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(db)
            .await
            .context("Failed to check account email")
            .map_err(AppError::database)
    }
}
