// src/db/flash_repository.rs
// DOCUMENTATION: Flash gallery persistence

use crate::errors::ApiError;
use crate::models::{normalize_tags, CreateFlashRequest, Flash, FlashQuery, UpdateFlashRequest};
use sqlx::PgPool;
use uuid::Uuid;

const FLASH_COLUMNS: &str = r#"
    id, artist_id, title, description, image_url, price, size, tags,
    is_available, created_at, updated_at
"#;

const GALLERY_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR artist_id = $1)
      AND ($2::text IS NULL OR $2 = ANY(tags))
      AND ($3::bool IS NULL OR is_available = $3)
"#;

pub struct FlashRepository;

impl FlashRepository {
    pub async fn create(
        pool: &PgPool,
        artist_id: Uuid,
        req: &CreateFlashRequest,
    ) -> Result<Flash, ApiError> {
        let sql = format!(
            r#"
            INSERT INTO flash (artist_id, title, description, image_url, price, size, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FLASH_COLUMNS
        );
        let flash = sqlx::query_as::<_, Flash>(&sql)
            .bind(artist_id)
            .bind(&req.title)
            .bind(&req.description)
            .bind(&req.image_url)
            .bind(req.price)
            .bind(&req.size)
            .bind(normalize_tags(&req.tags))
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to create flash for artist {}: {}", artist_id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        log::info!("Artist {} added flash {}", artist_id, flash.id);
        Ok(flash)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Flash, ApiError> {
        let sql = format!("SELECT {} FROM flash WHERE id = $1", FLASH_COLUMNS);
        sqlx::query_as::<_, Flash>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Flash {}", id)))
    }

    pub async fn search(pool: &PgPool, query: &FlashQuery) -> Result<(Vec<Flash>, i64), ApiError> {
        let page = query.page_params();
        let tag = query.tag.as_deref().map(|t| t.trim().to_lowercase());

        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM flash {}", GALLERY_FILTER))
            .bind(query.artist_id)
            .bind(&tag)
            .bind(query.available)
            .fetch_one(pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM flash {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            FLASH_COLUMNS, GALLERY_FILTER
        );
        let items = sqlx::query_as::<_, Flash>(&sql)
            .bind(query.artist_id)
            .bind(&tag)
            .bind(query.available)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok((items, total.0))
    }

    pub async fn recent_for_artist(
        pool: &PgPool,
        artist_id: Uuid,
        limit: i64,
    ) -> Result<(Vec<Flash>, i64), ApiError> {
        let query = FlashQuery {
            artist_id: Some(artist_id),
            limit: Some(limit),
            ..FlashQuery::default()
        };
        Self::search(pool, &query).await
    }

    pub async fn update(pool: &PgPool, id: Uuid, req: &UpdateFlashRequest) -> Result<Flash, ApiError> {
        let sql = format!(
            r#"
            UPDATE flash
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                image_url = COALESCE($3, image_url),
                price = COALESCE($4, price),
                size = COALESCE($5, size),
                tags = COALESCE($6, tags),
                is_available = COALESCE($7, is_available),
                updated_at = NOW()
            WHERE id = $8
            RETURNING {}
            "#,
            FLASH_COLUMNS
        );
        sqlx::query_as::<_, Flash>(&sql)
            .bind(&req.title)
            .bind(&req.description)
            .bind(&req.image_url)
            .bind(req.price)
            .bind(&req.size)
            .bind(req.tags.as_deref().map(normalize_tags))
            .bind(req.is_available)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Flash {}", id)))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM flash WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();
        if rows == 0 {
            return Err(ApiError::NotFound(format!("Flash {}", id)));
        }
        log::info!("Deleted flash {}", id);
        Ok(())
    }

    pub async fn count(pool: &PgPool) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM flash")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
