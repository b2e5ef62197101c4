// src/db/message_repository.rs
// DOCUMENTATION: Artist announcement persistence

use crate::errors::ApiError;
use crate::models::{ArtistMessage, CreateMessageRequest};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(
        pool: &PgPool,
        artist_id: Uuid,
        req: &CreateMessageRequest,
    ) -> Result<ArtistMessage, ApiError> {
        let message = sqlx::query_as::<_, ArtistMessage>(
            r#"
            INSERT INTO artist_messages (artist_id, title, content, priority, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(artist_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.priority.as_str())
        .bind(req.expires_at(Utc::now()))
        .fetch_one(pool)
        .await?;

        log::info!(
            "Artist {} posted message {} (expires {})",
            artist_id,
            message.id,
            message.expires_at
        );
        Ok(message)
    }

    /// Public view: active and not yet expired, highest priority first
    pub async fn active_for_artist(
        pool: &PgPool,
        artist_id: Uuid,
    ) -> Result<Vec<ArtistMessage>, ApiError> {
        Ok(sqlx::query_as::<_, ArtistMessage>(
            r#"
            SELECT * FROM artist_messages
            WHERE artist_id = $1 AND is_active = true AND expires_at > NOW()
            ORDER BY CASE priority WHEN 'HIGH' THEN 0 WHEN 'NORMAL' THEN 1 ELSE 2 END,
                     created_at DESC
            "#,
        )
        .bind(artist_id)
        .fetch_all(pool)
        .await?)
    }

    /// Owner view, including expired and deactivated messages
    pub async fn all_for_artist(
        pool: &PgPool,
        artist_id: Uuid,
    ) -> Result<Vec<ArtistMessage>, ApiError> {
        Ok(sqlx::query_as::<_, ArtistMessage>(
            "SELECT * FROM artist_messages WHERE artist_id = $1 ORDER BY created_at DESC",
        )
        .bind(artist_id)
        .fetch_all(pool)
        .await?)
    }

    /// Deactivate a message owned by `artist_id`
    pub async fn deactivate(pool: &PgPool, id: Uuid, artist_id: Uuid) -> Result<ArtistMessage, ApiError> {
        sqlx::query_as::<_, ArtistMessage>(
            r#"
            UPDATE artist_messages SET is_active = false
            WHERE id = $1 AND artist_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(artist_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Message {}", id)))
    }
}
