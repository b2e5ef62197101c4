// src/services/artist_service.rs
// DOCUMENTATION: Business logic for artist profiles

use crate::db::{ArtistRepository, Catalog, FlashRepository, ReviewRepository};
use crate::errors::ApiError;
use crate::models::{
    ArtistDetailResponse, ArtistListItem, ArtistProfile, ArtistQuery, CatalogItem, Paginated,
    UpdateArtistProfileRequest,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Flash pieces shown on the profile page
const RECENT_FLASH: i64 = 6;

pub struct ArtistService;

impl ArtistService {
    pub async fn search(
        pool: &PgPool,
        query: &ArtistQuery,
    ) -> Result<Paginated<ArtistListItem>, ApiError> {
        let (artists, total_count) = ArtistRepository::search(pool, query).await?;
        Ok(Paginated::new(artists, total_count, query.page_params()))
    }

    /// Profile with catalogs, rating summary and recent flash
    pub async fn get_artist(pool: &PgPool, id: Uuid) -> Result<ArtistDetailResponse, ApiError> {
        let profile = ArtistRepository::get_by_id(pool, id).await?;
        Self::detail(pool, profile).await
    }

    pub async fn get_own(pool: &PgPool, user_id: Uuid) -> Result<ArtistDetailResponse, ApiError> {
        let profile = ArtistRepository::get_by_user_id(pool, user_id).await?;
        Self::detail(pool, profile).await
    }

    async fn detail(pool: &PgPool, profile: ArtistProfile) -> Result<ArtistDetailResponse, ApiError> {
        let specialties = ArtistRepository::catalog_for(pool, Catalog::Specialties, profile.id).await?;
        let services = ArtistRepository::catalog_for(pool, Catalog::Services, profile.id).await?;
        let rating = ReviewRepository::summary_for(pool, profile.user_id).await?;
        let (recent, flash_count) =
            FlashRepository::recent_for_artist(pool, profile.id, RECENT_FLASH).await?;

        Ok(ArtistDetailResponse {
            profile,
            specialties,
            services,
            rating,
            flash_count,
            recent_flash: recent.iter().map(|f| f.to_response()).collect(),
        })
    }

    pub async fn update_own(
        pool: &PgPool,
        user_id: Uuid,
        req: &UpdateArtistProfileRequest,
    ) -> Result<ArtistProfile, ApiError> {
        let profile = ArtistRepository::update_by_user(pool, user_id, req).await?;
        log::info!("Artist {} updated their profile", profile.id);
        Ok(profile)
    }

    /// Replace the caller's specialties or services
    pub async fn set_catalog(
        pool: &PgPool,
        user_id: Uuid,
        catalog: Catalog,
        ids: &[Uuid],
    ) -> Result<Vec<CatalogItem>, ApiError> {
        let profile = ArtistRepository::get_by_user_id(pool, user_id).await?;
        ArtistRepository::replace_catalog(pool, catalog, profile.id, ids).await
    }
}
