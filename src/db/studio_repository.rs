// src/db/studio_repository.rs
// DOCUMENTATION: Studio persistence
// PURPOSE: Directory queries, membership, map/nearby lookups and geocoding write-back

use crate::errors::ApiError;
use crate::models::{
    CreateStudioRequest, GeocodeResult, NearbyStudio, Studio, StudioAddress, StudioArtist,
    StudioQuery, UpdateStudioRequest,
};
use sqlx::PgPool;
use uuid::Uuid;

const STUDIO_COLUMNS: &str = r#"
    s.id, s.name, s.description, s.address, s.city, s.state, s.zip_code, s.country,
    s.phone, s.email, s.website, s.instagram, s.latitude, s.longitude,
    s.is_verified, s.is_featured, s.owner_id, s.geocode_status, s.geocode_error,
    s.created_at, s.updated_at
"#;

const DIRECTORY_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR s.city ILIKE '%' || $1 || '%')
      AND ($2::bool IS NULL OR s.is_verified = $2)
      AND ($3::bool IS NULL OR s.is_featured = $3)
      AND ($4::text IS NULL OR s.name ILIKE '%' || $4 || '%' OR s.description ILIKE '%' || $4 || '%')
"#;

const ADDRESS_COLUMNS: &str =
    "id, name, address, city, state, zip_code, country, latitude, longitude";

/// Great-circle distance in km between the row and ($1, $2), Earth radius 6371 km
const HAVERSINE_KM: &str = r#"
    6371.0 * 2.0 * ASIN(LEAST(1.0, SQRT(
        POWER(SIN(RADIANS(s.latitude - $1) / 2.0), 2)
        + COS(RADIANS($1)) * COS(RADIANS(s.latitude))
          * POWER(SIN(RADIANS(s.longitude - $2) / 2.0), 2)
    )))
"#;

pub struct StudioRepository;

impl StudioRepository {
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        req: &CreateStudioRequest,
    ) -> Result<Studio, ApiError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO studios (
                name, description, address, city, state, zip_code, country,
                phone, email, website, instagram, latitude, longitude, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(&req.name) // $1
        .bind(&req.description) // $2
        .bind(&req.address) // $3
        .bind(&req.city) // $4
        .bind(&req.state) // $5
        .bind(&req.zip_code) // $6
        .bind(&req.country) // $7
        .bind(&req.phone) // $8
        .bind(&req.email) // $9
        .bind(&req.website) // $10
        .bind(&req.instagram) // $11
        .bind(req.latitude) // $12
        .bind(req.longitude) // $13
        .bind(owner_id) // $14
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create studio: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let studio = Self::get_by_id(pool, id).await?;
        log::info!("Created studio {} ({})", studio.name, studio.id);
        Ok(studio)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Studio, ApiError> {
        let sql = format!("SELECT {} FROM studios s WHERE s.id = $1", STUDIO_COLUMNS);
        sqlx::query_as::<_, Studio>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Studio {}", id)))
    }

    /// Directory search
    /// DOCUMENTATION: Featured and verified studios first
    pub async fn search(
        pool: &PgPool,
        query: &StudioQuery,
    ) -> Result<(Vec<Studio>, i64), ApiError> {
        let page = query.page_params();

        let count_sql = format!("SELECT COUNT(*) FROM studios s {}", DIRECTORY_FILTER);
        let total: (i64,) = sqlx::query_as(&count_sql)
            .bind(&query.city)
            .bind(query.verified)
            .bind(query.featured)
            .bind(&query.q)
            .fetch_one(pool)
            .await?;

        let sql = format!(
            r#"
            SELECT {} FROM studios s
            {}
            ORDER BY s.is_featured DESC, s.is_verified DESC, s.name ASC
            LIMIT $5 OFFSET $6
            "#,
            STUDIO_COLUMNS, DIRECTORY_FILTER
        );
        let studios = sqlx::query_as::<_, Studio>(&sql)
            .bind(&query.city)
            .bind(query.verified)
            .bind(query.featured)
            .bind(&query.q)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Studio search query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        Ok((studios, total.0))
    }

    /// Partial update
    /// DOCUMENTATION: Address changes drop the coordinates so the geocoder picks the studio up again
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateStudioRequest,
    ) -> Result<Studio, ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE studios
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                zip_code = COALESCE($6, zip_code),
                country = COALESCE($7, country),
                phone = COALESCE($8, phone),
                email = COALESCE($9, email),
                website = COALESCE($10, website),
                instagram = COALESCE($11, instagram),
                latitude = CASE WHEN $12 THEN NULL ELSE latitude END,
                longitude = CASE WHEN $12 THEN NULL ELSE longitude END,
                geocode_status = CASE WHEN $12 THEN NULL ELSE geocode_status END,
                geocode_error = CASE WHEN $12 THEN NULL ELSE geocode_error END,
                updated_at = NOW()
            WHERE id = $13
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.address)
        .bind(&req.city)
        .bind(&req.state)
        .bind(&req.zip_code)
        .bind(&req.country)
        .bind(&req.phone)
        .bind(&req.email)
        .bind(&req.website)
        .bind(&req.instagram)
        .bind(req.touches_address())
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("Studio {}", id)));
        }

        log::info!("Updated studio {}", id);
        Self::get_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query("DELETE FROM studios WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();
        if rows == 0 {
            return Err(ApiError::NotFound(format!("Studio {}", id)));
        }
        log::info!("Deleted studio {}", id);
        Ok(())
    }

    pub async fn set_flags(
        pool: &PgPool,
        id: Uuid,
        verified: Option<bool>,
        featured: Option<bool>,
    ) -> Result<Studio, ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE studios
            SET is_verified = COALESCE($1, is_verified),
                is_featured = COALESCE($2, is_featured),
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(verified)
        .bind(featured)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("Studio {}", id)));
        }
        Self::get_by_id(pool, id).await
    }

    pub async fn artists(pool: &PgPool, studio_id: Uuid) -> Result<Vec<StudioArtist>, ApiError> {
        Ok(sqlx::query_as::<_, StudioArtist>(
            r#"
            SELECT a.id AS artist_id, a.user_id, u.name, sa.role, a.is_verified, sa.joined_at
            FROM studio_artists sa
            JOIN artist_profiles a ON a.id = sa.artist_id
            JOIN users u ON u.id = a.user_id
            WHERE sa.studio_id = $1
            ORDER BY sa.joined_at ASC
            "#,
        )
        .bind(studio_id)
        .fetch_all(pool)
        .await?)
    }

    /// Idempotent: re-adding an artist only updates the role
    pub async fn add_artist(
        pool: &PgPool,
        studio_id: Uuid,
        artist_id: Uuid,
        role: &str,
    ) -> Result<(), ApiError> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO studio_artists (studio_id, artist_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (studio_id, artist_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(studio_id)
        .bind(artist_id)
        .bind(role)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                ApiError::NotFound(format!("Artist {}", artist_id))
            }
            other => ApiError::DatabaseError(other.to_string()),
        })?;

        sqlx::query(
            "UPDATE artist_profiles SET studio_id = $1, updated_at = NOW() WHERE id = $2 AND studio_id IS NULL",
        )
        .bind(studio_id)
        .bind(artist_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn remove_artist(
        pool: &PgPool,
        studio_id: Uuid,
        artist_id: Uuid,
    ) -> Result<bool, ApiError> {
        let mut tx = pool.begin().await?;

        let rows = sqlx::query("DELETE FROM studio_artists WHERE studio_id = $1 AND artist_id = $2")
            .bind(studio_id)
            .bind(artist_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(
            "UPDATE artist_profiles SET studio_id = NULL, updated_at = NOW() WHERE id = $1 AND studio_id = $2",
        )
        .bind(artist_id)
        .bind(studio_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows > 0)
    }

    /// Every studio that has coordinates, for the map view
    pub async fn with_coordinates(pool: &PgPool) -> Result<Vec<Studio>, ApiError> {
        let sql = format!(
            r#"
            SELECT {} FROM studios s
            WHERE s.latitude IS NOT NULL AND s.longitude IS NOT NULL
            ORDER BY s.is_featured DESC, s.name ASC
            "#,
            STUDIO_COLUMNS
        );
        Ok(sqlx::query_as::<_, Studio>(&sql).fetch_all(pool).await?)
    }

    /// Studios within `radius_km` of (lat, lng), nearest first
    pub async fn nearby(
        pool: &PgPool,
        lat: f64,
        lng: f64,
        radius_km: f64,
        limit: i64,
    ) -> Result<Vec<NearbyStudio>, ApiError> {
        let sql = format!(
            r#"
            SELECT * FROM (
                SELECT {columns}, {distance} AS distance_km
                FROM studios s
                WHERE s.latitude IS NOT NULL AND s.longitude IS NOT NULL
            ) ranked
            WHERE distance_km <= $3
            ORDER BY distance_km ASC
            LIMIT $4
            "#,
            columns = STUDIO_COLUMNS,
            distance = HAVERSINE_KM
        );
        Ok(sqlx::query_as::<_, NearbyStudio>(&sql)
            .bind(lat)
            .bind(lng)
            .bind(radius_km)
            .bind(limit)
            .fetch_all(pool)
            .await?)
    }

    /// Studios still waiting for coordinates, oldest first
    /// DOCUMENTATION: Studios whose last lookup failed come after every untried one
    pub async fn missing_coordinates(
        pool: &PgPool,
        limit: Option<i64>,
    ) -> Result<Vec<StudioAddress>, ApiError> {
        let sql = format!(
            r#"
            SELECT {} FROM studios
            WHERE latitude IS NULL OR longitude IS NULL
            ORDER BY (geocode_status IS NOT DISTINCT FROM 'FAILED') ASC, created_at ASC
            LIMIT $1
            "#,
            ADDRESS_COLUMNS
        );
        Ok(sqlx::query_as::<_, StudioAddress>(&sql)
            .bind(limit.unwrap_or(i64::MAX))
            .fetch_all(pool)
            .await?)
    }

    pub async fn address_of(pool: &PgPool, id: Uuid) -> Result<StudioAddress, ApiError> {
        let sql = format!("SELECT {} FROM studios WHERE id = $1", ADDRESS_COLUMNS);
        sqlx::query_as::<_, StudioAddress>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Studio {}", id)))
    }

    pub async fn save_coordinates(
        pool: &PgPool,
        id: Uuid,
        result: &GeocodeResult,
    ) -> Result<(), ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE studios
            SET latitude = $1, longitude = $2,
                geocode_status = 'OK', geocode_error = NULL,
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(result.latitude)
        .bind(result.longitude)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("Studio {}", id)));
        }
        Ok(())
    }

    pub async fn mark_geocode_failed(pool: &PgPool, id: Uuid, reason: &str) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE studios
            SET geocode_status = 'FAILED', geocode_error = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(reason)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// (total, without coordinates, failed geocoding)
    pub async fn coordinate_counts(pool: &PgPool) -> Result<(i64, i64, i64), ApiError> {
        Ok(sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE latitude IS NULL OR longitude IS NULL),
                COUNT(*) FILTER (WHERE geocode_status = 'FAILED')
            FROM studios
            "#,
        )
        .fetch_one(pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn insert_studio(pool: &PgPool, name: &str, age_minutes: i64) -> Uuid {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO studios (name, created_at) VALUES ($1, NOW() - make_interval(mins => $2)) RETURNING id",
        )
        .bind(name)
        .bind(age_minutes as i32)
        .fetch_one(pool)
        .await
        .unwrap();
        id
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_failed_studios_queue_behind_untried(pool: PgPool) {
        let oldest = insert_studio(&pool, "Oldest", 30).await;
        let older = insert_studio(&pool, "Older", 20).await;
        let newest = insert_studio(&pool, "Newest", 10).await;

        StudioRepository::mark_geocode_failed(&pool, oldest, "no results").await.unwrap();
        StudioRepository::mark_geocode_failed(&pool, older, "no results").await.unwrap();

        let first = StudioRepository::missing_coordinates(&pool, Some(1)).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, newest);

        let all: Vec<Uuid> = StudioRepository::missing_coordinates(&pool, None)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(all, vec![newest, oldest, older]);
    }
}
