// src/db/artist_repository.rs
// DOCUMENTATION: Artist profile persistence
// PURPOSE: Directory search, profile updates and specialty/service sets

use crate::errors::ApiError;
use crate::models::{
    ArtistListItem, ArtistProfile, ArtistQuery, CatalogItem, UpdateArtistProfileRequest,
    VerificationStatus,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const PROFILE_SELECT: &str = r#"
    SELECT
        a.id, a.user_id, u.name, a.bio, a.city, a.state, a.country,
        a.hourly_rate, a.min_price, a.instagram, a.website, a.profile_image,
        a.is_verified, a.verification_status, a.studio_id,
        a.created_at, a.updated_at
    FROM artist_profiles a
    JOIN users u ON u.id = a.user_id
"#;

/// Shared by the count and page queries of the directory search
const DIRECTORY_FILTER: &str = r#"
    WHERE u.is_active = true
      AND ($1::text IS NULL OR a.city ILIKE '%' || $1 || '%')
      AND ($2::text IS NULL OR EXISTS (
            SELECT 1 FROM artist_specialties x
            JOIN specialties s ON s.id = x.specialty_id
            WHERE x.artist_id = a.id AND s.name ILIKE $2))
      AND ($3::bool IS NULL OR a.is_verified = $3)
      AND ($4::text IS NULL OR u.name ILIKE '%' || $4 || '%' OR a.bio ILIKE '%' || $4 || '%')
"#;

/// Which join table a catalog operation targets
#[derive(Debug, Clone, Copy)]
pub enum Catalog {
    Specialties,
    Services,
}

impl Catalog {
    fn table(&self) -> &'static str {
        match self {
            Catalog::Specialties => "specialties",
            Catalog::Services => "services",
        }
    }

    fn join_table(&self) -> &'static str {
        match self {
            Catalog::Specialties => "artist_specialties",
            Catalog::Services => "artist_services",
        }
    }

    fn join_column(&self) -> &'static str {
        match self {
            Catalog::Specialties => "specialty_id",
            Catalog::Services => "service_id",
        }
    }
}

pub struct ArtistRepository;

impl ArtistRepository {
    /// Empty profile created alongside an ARTIST account
    pub async fn create_empty(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<Uuid, ApiError> {
        let (id,): (Uuid,) =
            sqlx::query_as("INSERT INTO artist_profiles (user_id) VALUES ($1) RETURNING id")
                .bind(user_id)
                .fetch_one(&mut **tx)
                .await?;
        Ok(id)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<ArtistProfile, ApiError> {
        let sql = format!("{} WHERE a.id = $1", PROFILE_SELECT);
        sqlx::query_as::<_, ArtistProfile>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Artist {}", id)))
    }

    pub async fn get_by_user_id(pool: &PgPool, user_id: Uuid) -> Result<ArtistProfile, ApiError> {
        let sql = format!("{} WHERE a.user_id = $1", PROFILE_SELECT);
        sqlx::query_as::<_, ArtistProfile>(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Artist profile for this account".to_string()))
    }

    /// Directory search
    /// DOCUMENTATION: Returns tuple: (results, total_count) for pagination
    pub async fn search(
        pool: &PgPool,
        query: &ArtistQuery,
    ) -> Result<(Vec<ArtistListItem>, i64), ApiError> {
        let page = query.page_params();

        let count_sql = format!(
            "SELECT COUNT(*) FROM artist_profiles a JOIN users u ON u.id = a.user_id {}",
            DIRECTORY_FILTER
        );
        let total: (i64,) = sqlx::query_as(&count_sql)
            .bind(&query.city)
            .bind(&query.specialty)
            .bind(query.verified)
            .bind(&query.q)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Artist count query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let sql = format!(
            r#"
            SELECT
                a.id, a.user_id, u.name, a.city, a.state, a.country,
                a.min_price, a.profile_image, a.is_verified,
                r.average_rating, r.review_count,
                COALESCE(sp.names, ARRAY[]::text[]) AS specialties
            FROM artist_profiles a
            JOIN users u ON u.id = a.user_id
            LEFT JOIN LATERAL (
                SELECT AVG(rating)::float8 AS average_rating, COUNT(*) AS review_count
                FROM reviews WHERE recipient_id = a.user_id
            ) r ON true
            LEFT JOIN LATERAL (
                SELECT ARRAY_AGG(s.name ORDER BY s.name) AS names
                FROM artist_specialties x
                JOIN specialties s ON s.id = x.specialty_id
                WHERE x.artist_id = a.id
            ) sp ON true
            {}
            ORDER BY a.is_verified DESC, r.average_rating DESC NULLS LAST, a.created_at DESC
            LIMIT $5 OFFSET $6
            "#,
            DIRECTORY_FILTER
        );

        let artists = sqlx::query_as::<_, ArtistListItem>(&sql)
            .bind(&query.city)
            .bind(&query.specialty)
            .bind(query.verified)
            .bind(&query.q)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Artist search query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        log::debug!(
            "Artist search: {} results, {} total (page {})",
            artists.len(),
            total.0,
            page.page()
        );

        Ok((artists, total.0))
    }

    /// Partial update of the caller's own profile
    pub async fn update_by_user(
        pool: &PgPool,
        user_id: Uuid,
        req: &UpdateArtistProfileRequest,
    ) -> Result<ArtistProfile, ApiError> {
        let updated: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE artist_profiles
            SET bio = COALESCE($1, bio),
                city = COALESCE($2, city),
                state = COALESCE($3, state),
                country = COALESCE($4, country),
                hourly_rate = COALESCE($5, hourly_rate),
                min_price = COALESCE($6, min_price),
                instagram = COALESCE($7, instagram),
                website = COALESCE($8, website),
                profile_image = COALESCE($9, profile_image),
                updated_at = NOW()
            WHERE user_id = $10
            RETURNING id
            "#,
        )
        .bind(&req.bio)
        .bind(&req.city)
        .bind(&req.state)
        .bind(&req.country)
        .bind(req.hourly_rate)
        .bind(req.min_price)
        .bind(&req.instagram)
        .bind(&req.website)
        .bind(&req.profile_image)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let (id,) = updated
            .ok_or_else(|| ApiError::NotFound("Artist profile for this account".to_string()))?;
        Self::get_by_id(pool, id).await
    }

    pub async fn set_verification(
        pool: &PgPool,
        id: Uuid,
        status: VerificationStatus,
    ) -> Result<ArtistProfile, ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE artist_profiles
            SET verification_status = $1, is_verified = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(status.is_verified())
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("Artist {}", id)));
        }
        Self::get_by_id(pool, id).await
    }

    /// Full catalog of specialties or services
    pub async fn list_catalog(pool: &PgPool, catalog: Catalog) -> Result<Vec<CatalogItem>, ApiError> {
        let sql = format!(
            "SELECT id, name, description FROM {} ORDER BY name",
            catalog.table()
        );
        Ok(sqlx::query_as::<_, CatalogItem>(&sql).fetch_all(pool).await?)
    }

    /// Entries of `catalog` attached to an artist
    pub async fn catalog_for(
        pool: &PgPool,
        catalog: Catalog,
        artist_id: Uuid,
    ) -> Result<Vec<CatalogItem>, ApiError> {
        let sql = format!(
            r#"
            SELECT c.id, c.name, c.description
            FROM {table} c
            JOIN {join} j ON j.{col} = c.id
            WHERE j.artist_id = $1
            ORDER BY c.name
            "#,
            table = catalog.table(),
            join = catalog.join_table(),
            col = catalog.join_column()
        );
        Ok(sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(artist_id)
            .fetch_all(pool)
            .await?)
    }

    /// Replace an artist's specialty or service set atomically
    /// DOCUMENTATION: Unknown ids are rejected with 400 before anything changes
    pub async fn replace_catalog(
        pool: &PgPool,
        catalog: Catalog,
        artist_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<CatalogItem>, ApiError> {
        let mut tx = pool.begin().await?;

        let known: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {} WHERE id = ANY($1)",
            catalog.table()
        ))
        .bind(ids)
        .fetch_one(&mut *tx)
        .await?;

        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();
        if known.0 != unique.len() as i64 {
            return Err(ApiError::invalid_field("ids", "contains unknown entries"));
        }

        sqlx::query(&format!(
            "DELETE FROM {} WHERE artist_id = $1",
            catalog.join_table()
        ))
        .bind(artist_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "INSERT INTO {} (artist_id, {}) SELECT $1, UNNEST($2::uuid[])",
            catalog.join_table(),
            catalog.join_column()
        ))
        .bind(artist_id)
        .bind(&unique)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "Artist {} now has {} {}",
            artist_id,
            unique.len(),
            catalog.table()
        );
        Self::catalog_for(pool, catalog, artist_id).await
    }

    pub async fn count_pending(pool: &PgPool) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM artist_profiles WHERE verification_status = 'PENDING'",
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
