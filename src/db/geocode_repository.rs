// src/db/geocode_repository.rs
// DOCUMENTATION: Persistent address -> coordinates cache

use crate::errors::ApiError;
use crate::models::{CacheStats, GeocodeCacheEntry, GeocodeResult};
use sqlx::PgPool;

pub struct GeocodeCacheRepository;

impl GeocodeCacheRepository {
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<GeocodeResult>, ApiError> {
        Ok(sqlx::query_as::<_, GeocodeResult>(
            "SELECT latitude, longitude, formatted_address, place_id FROM geocode_cache WHERE address = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await?)
    }

    /// Insert or refresh an entry
    pub async fn put(pool: &PgPool, key: &str, result: &GeocodeResult) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO geocode_cache (address, latitude, longitude, formatted_address, place_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (address) DO UPDATE
            SET latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                formatted_address = EXCLUDED.formatted_address,
                place_id = EXCLUDED.place_id,
                created_at = NOW()
            "#,
        )
        .bind(key)
        .bind(result.latitude)
        .bind(result.longitude)
        .bind(&result.formatted_address)
        .bind(&result.place_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn clear(pool: &PgPool) -> Result<u64, ApiError> {
        let rows = sqlx::query("DELETE FROM geocode_cache")
            .execute(pool)
            .await?
            .rows_affected();
        log::info!("Geocode cache cleared: {} entries removed", rows);
        Ok(rows)
    }

    pub async fn stats(pool: &PgPool) -> Result<CacheStats, ApiError> {
        Ok(sqlx::query_as::<_, CacheStats>(
            r#"
            SELECT COUNT(*) AS total_entries,
                   MIN(created_at) AS oldest_entry,
                   MAX(created_at) AS newest_entry
            FROM geocode_cache
            "#,
        )
        .fetch_one(pool)
        .await?)
    }

    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<GeocodeCacheEntry>, ApiError> {
        Ok(sqlx::query_as::<_, GeocodeCacheEntry>(
            "SELECT * FROM geocode_cache ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?)
    }
}
