// src/db/review_repository.rs
// DOCUMENTATION: Review database operations
// PURPOSE: Handle CRUD operations for user-to-user reviews

use crate::errors::ApiError;
use crate::models::{
    CreateReviewRequest, RatingSummary, Review, ReviewWithAuthor, UpdateReviewRequest,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ReviewRepository;

impl ReviewRepository {
    /// Create a new review
    /// DOCUMENTATION: The (author, recipient) unique constraint surfaces as 409
    pub async fn create_review(
        pool: &PgPool,
        author_id: Uuid,
        req: &CreateReviewRequest,
    ) -> Result<Review, ApiError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (author_id, recipient_id, rating, title, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(author_id)
        .bind(req.recipient_id)
        .bind(req.rating)
        .bind(&req.title)
        .bind(&req.comment)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                ApiError::Conflict("You have already reviewed this user".to_string())
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                ApiError::NotFound(format!("User {}", req.recipient_id))
            }
            other => {
                log::error!("Failed to create review: {}", other);
                ApiError::DatabaseError(format!("Create review failed: {}", other))
            }
        })?;

        Ok(review)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Review, ApiError> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Review {}", id)))
    }

    /// Get reviews for a recipient, newest first
    pub async fn get_reviews_for(
        pool: &PgPool,
        recipient_id: Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, ApiError> {
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
            r#"
            SELECT r.id, r.author_id, u.name AS author_name, r.recipient_id,
                   r.rating, r.title, r.comment, r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.author_id
            WHERE r.recipient_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(recipient_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch reviews for {}: {}", recipient_id, e);
            ApiError::DatabaseError(format!("Fetch reviews failed: {}", e))
        })?;

        Ok(reviews)
    }

    pub async fn summary_for(pool: &PgPool, recipient_id: Uuid) -> Result<RatingSummary, ApiError> {
        Ok(sqlx::query_as::<_, RatingSummary>(
            "SELECT AVG(rating)::float8 AS average, COUNT(*) AS count FROM reviews WHERE recipient_id = $1",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?)
    }

    pub async fn update_review(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateReviewRequest,
    ) -> Result<Review, ApiError> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET rating = COALESCE($1, rating),
                title = COALESCE($2, title),
                comment = COALESCE($3, comment),
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(req.rating)
        .bind(&req.title)
        .bind(&req.comment)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Review {}", id)))
    }

    pub async fn delete_review(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();
        if rows == 0 {
            return Err(ApiError::NotFound(format!("Review {}", id)));
        }
        Ok(())
    }

    pub async fn count(pool: &PgPool) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
