// src/services/message_service.rs
// DOCUMENTATION: Time-limited artist announcements

use crate::db::{ArtistRepository, MessageRepository};
use crate::errors::ApiError;
use crate::models::{ArtistMessage, CreateMessageRequest};
use sqlx::PgPool;
use uuid::Uuid;

pub struct MessageService;

impl MessageService {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: &CreateMessageRequest,
    ) -> Result<ArtistMessage, ApiError> {
        let profile = ArtistRepository::get_by_user_id(pool, user_id).await?;
        MessageRepository::create(pool, profile.id, req).await
    }

    /// Public view of an artist's current announcements
    pub async fn list_active(pool: &PgPool, artist_id: Uuid) -> Result<Vec<ArtistMessage>, ApiError> {
        ArtistRepository::get_by_id(pool, artist_id).await?;
        MessageRepository::active_for_artist(pool, artist_id).await
    }

    pub async fn list_mine(pool: &PgPool, user_id: Uuid) -> Result<Vec<ArtistMessage>, ApiError> {
        let profile = ArtistRepository::get_by_user_id(pool, user_id).await?;
        MessageRepository::all_for_artist(pool, profile.id).await
    }

    pub async fn deactivate(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<ArtistMessage, ApiError> {
        let profile = ArtistRepository::get_by_user_id(pool, user_id).await?;
        let message = MessageRepository::deactivate(pool, id, profile.id).await?;
        log::info!("Artist {} deactivated message {}", profile.id, id);
        Ok(message)
    }
}
