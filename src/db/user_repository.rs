// src/db/user_repository.rs
// DOCUMENTATION: Account persistence
// PURPOSE: Users table queries, including reset-token bookkeeping

use crate::errors::ApiError;
use crate::models::{PageParams, Role, User, UserRow};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const USER_COLUMNS: &str = r#"
    id, email, password_hash, name, role, is_active,
    reset_token_hash, reset_token_expires_at, created_at, updated_at
"#;

fn into_user(row: UserRow) -> Result<User, ApiError> {
    User::try_from(row).map_err(ApiError::InternalError)
}

pub struct UserRepository;

impl UserRepository {
    /// Insert a user inside the registration transaction
    /// DOCUMENTATION: Maps the unique-email violation to 409
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> Result<User, ApiError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, name, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(name)
            .bind(role.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    ApiError::Conflict("An account with this email already exists".to_string())
                }
                other => {
                    log::error!("Failed to create user {}: {}", email, other);
                    ApiError::DatabaseError(other.to_string())
                }
            })?;

        into_user(row)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await?
            .map(into_user)
            .transpose()
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<User, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {}", id)))?;
        into_user(row)
    }

    pub async fn find_by_reset_token(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE reset_token_hash = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(token_hash)
            .fetch_optional(pool)
            .await?
            .map(into_user)
            .transpose()
    }

    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $1, reset_token_expires_at = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(token_hash)
        .bind(expires_at)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the password and consume the reset token in one statement
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }

    pub async fn set_active(pool: &PgPool, id: Uuid, active: bool) -> Result<User, ApiError> {
        let sql = format!(
            "UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(active)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {}", id)))?;
        into_user(row)
    }

    pub async fn list(
        pool: &PgPool,
        role: Option<Role>,
        page: PageParams,
    ) -> Result<(Vec<User>, i64), ApiError> {
        let role = role.map(|r| r.as_str());

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR role = $1)")
                .bind(role)
                .fetch_one(pool)
                .await?;

        let sql = format!(
            r#"
            SELECT {} FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, UserRow>(&sql)
            .bind(role)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(into_user)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((users, total.0))
    }
}
