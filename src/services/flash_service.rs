// src/services/flash_service.rs
// DOCUMENTATION: Flash gallery rules: artists manage their own pieces

use crate::auth::AuthUser;
use crate::db::{ArtistRepository, FlashRepository};
use crate::errors::ApiError;
use crate::models::{
    CreateFlashRequest, Flash, FlashQuery, FlashResponse, NewAdminAction, Paginated, Role,
    UpdateFlashRequest,
};
use crate::services::AdminService;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct FlashService;

impl FlashService {
    pub async fn search(pool: &PgPool, query: &FlashQuery) -> Result<Paginated<FlashResponse>, ApiError> {
        let (items, total_count) = FlashRepository::search(pool, query).await?;
        Ok(Paginated::new(
            items.iter().map(Flash::to_response).collect(),
            total_count,
            query.page_params(),
        ))
    }

    pub async fn create(
        pool: &PgPool,
        caller: AuthUser,
        req: &CreateFlashRequest,
    ) -> Result<Flash, ApiError> {
        caller.require_role(&[Role::Artist])?;
        let profile = ArtistRepository::get_by_user_id(pool, caller.user_id).await?;
        FlashRepository::create(pool, profile.id, req).await
    }

    /// Load a piece and confirm the caller's artist profile owns it
    async fn owned(pool: &PgPool, caller: AuthUser, id: Uuid) -> Result<Flash, ApiError> {
        let flash = FlashRepository::get_by_id(pool, id).await?;
        let profile = ArtistRepository::get_by_user_id(pool, caller.user_id)
            .await
            .map_err(|_| ApiError::Forbidden("not the owner of this flash".to_string()))?;
        if profile.id != flash.artist_id {
            return Err(ApiError::Forbidden("not the owner of this flash".to_string()));
        }
        Ok(flash)
    }

    pub async fn update(
        pool: &PgPool,
        caller: AuthUser,
        id: Uuid,
        req: &UpdateFlashRequest,
    ) -> Result<Flash, ApiError> {
        caller.require_role(&[Role::Artist])?;
        Self::owned(pool, caller, id).await?;
        FlashRepository::update(pool, id, req).await
    }

    /// Owning artist, or an admin (audited)
    pub async fn delete(pool: &PgPool, caller: AuthUser, id: Uuid) -> Result<(), ApiError> {
        if caller.is_admin() {
            let flash = FlashRepository::get_by_id(pool, id).await?;
            FlashRepository::delete(pool, id).await?;
            AdminService::record(
                pool,
                NewAdminAction {
                    admin_id: caller.user_id,
                    action: "DELETE_FLASH",
                    target_type: "FLASH",
                    target_id: Some(id),
                    reason: None,
                    metadata: Some(json!({ "artist_id": flash.artist_id, "title": flash.title })),
                },
            )
            .await?;
            return Ok(());
        }

        caller.require_role(&[Role::Artist])?;
        Self::owned(pool, caller, id).await?;
        FlashRepository::delete(pool, id).await
    }
}
