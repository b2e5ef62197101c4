// src/db/admin_repository.rs
// DOCUMENTATION: Moderation audit log and dashboard counters

use crate::errors::ApiError;
use crate::models::{AdminAction, NewAdminAction, PageParams, RoleCount};
use sqlx::PgPool;

pub struct AdminRepository;

impl AdminRepository {
    pub async fn record(pool: &PgPool, action: &NewAdminAction) -> Result<AdminAction, ApiError> {
        let row = sqlx::query_as::<_, AdminAction>(
            r#"
            INSERT INTO admin_actions (admin_id, action, target_type, target_id, reason, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(action.admin_id)
        .bind(action.action)
        .bind(action.target_type)
        .bind(action.target_id)
        .bind(&action.reason)
        .bind(&action.metadata)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to record admin action {}: {}", action.action, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!(
            "Admin {} performed {} on {} {:?}",
            action.admin_id,
            action.action,
            action.target_type,
            action.target_id
        );
        Ok(row)
    }

    pub async fn list(pool: &PgPool, page: PageParams) -> Result<(Vec<AdminAction>, i64), ApiError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_actions")
            .fetch_one(pool)
            .await?;

        let actions = sqlx::query_as::<_, AdminAction>(
            "SELECT * FROM admin_actions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok((actions, total.0))
    }

    pub async fn users_by_role(pool: &PgPool) -> Result<Vec<RoleCount>, ApiError> {
        Ok(sqlx::query_as::<_, RoleCount>(
            "SELECT role, COUNT(*) AS count FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(pool)
        .await?)
    }
}
