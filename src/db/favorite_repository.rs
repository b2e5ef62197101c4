// src/db/favorite_repository.rs
// DOCUMENTATION: Client-to-artist bookmarks

use crate::errors::ApiError;
use crate::models::FavoriteArtist;
use sqlx::PgPool;
use uuid::Uuid;

pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Returns true when a new row was inserted; re-adding is a no-op
    pub async fn add(pool: &PgPool, client_id: Uuid, artist_id: Uuid) -> Result<bool, ApiError> {
        let rows = sqlx::query(
            r#"
            INSERT INTO favorites (client_id, artist_id)
            VALUES ($1, $2)
            ON CONFLICT (client_id, artist_id) DO NOTHING
            "#,
        )
        .bind(client_id)
        .bind(artist_id)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                ApiError::NotFound(format!("Artist {}", artist_id))
            }
            other => ApiError::DatabaseError(other.to_string()),
        })?
        .rows_affected();

        Ok(rows > 0)
    }

    /// Returns true when a row was deleted; removing twice is a no-op
    pub async fn remove(pool: &PgPool, client_id: Uuid, artist_id: Uuid) -> Result<bool, ApiError> {
        let rows = sqlx::query("DELETE FROM favorites WHERE client_id = $1 AND artist_id = $2")
            .bind(client_id)
            .bind(artist_id)
            .execute(pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    pub async fn exists(pool: &PgPool, client_id: Uuid, artist_id: Uuid) -> Result<bool, ApiError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE client_id = $1 AND artist_id = $2)",
        )
        .bind(client_id)
        .bind(artist_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    pub async fn list(pool: &PgPool, client_id: Uuid) -> Result<Vec<FavoriteArtist>, ApiError> {
        Ok(sqlx::query_as::<_, FavoriteArtist>(
            r#"
            SELECT a.id AS artist_id, a.user_id, u.name, a.city, a.profile_image,
                   a.is_verified, f.created_at AS favorited_at
            FROM favorites f
            JOIN artist_profiles a ON a.id = f.artist_id
            JOIN users u ON u.id = a.user_id
            WHERE f.client_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?)
    }
}
