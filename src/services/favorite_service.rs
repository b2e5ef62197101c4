// src/services/favorite_service.rs
// DOCUMENTATION: Client bookmarks; add and remove are idempotent

use crate::db::{ArtistRepository, FavoriteRepository};
use crate::errors::ApiError;
use crate::models::{FavoriteArtist, FavoriteStatus};
use sqlx::PgPool;
use uuid::Uuid;

pub struct FavoriteService;

impl FavoriteService {
    /// `changed` is false when the artist was already a favorite
    pub async fn add(pool: &PgPool, client_id: Uuid, artist_id: Uuid) -> Result<FavoriteStatus, ApiError> {
        ArtistRepository::get_by_id(pool, artist_id).await?;
        let created = FavoriteRepository::add(pool, client_id, artist_id).await?;
        if created {
            log::info!("Client {} favorited artist {}", client_id, artist_id);
        }
        Ok(FavoriteStatus {
            artist_id,
            is_favorite: true,
            changed: created,
        })
    }

    /// Succeeds whether or not the favorite existed
    pub async fn remove(
        pool: &PgPool,
        client_id: Uuid,
        artist_id: Uuid,
    ) -> Result<FavoriteStatus, ApiError> {
        let removed = FavoriteRepository::remove(pool, client_id, artist_id).await?;
        Ok(FavoriteStatus {
            artist_id,
            is_favorite: false,
            changed: removed,
        })
    }

    pub async fn check(pool: &PgPool, client_id: Uuid, artist_id: Uuid) -> Result<FavoriteStatus, ApiError> {
        Ok(FavoriteStatus {
            artist_id,
            is_favorite: FavoriteRepository::exists(pool, client_id, artist_id).await?,
            changed: false,
        })
    }

    pub async fn list(pool: &PgPool, client_id: Uuid) -> Result<Vec<FavoriteArtist>, ApiError> {
        FavoriteRepository::list(pool, client_id).await
    }
}
