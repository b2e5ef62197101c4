// src/services/admin_service.rs
// DOCUMENTATION: Moderation actions and dashboard statistics
// PURPOSE: Every change made here is written to the admin_actions audit log

use crate::db::{
    AdminRepository, ArtistRepository, FlashRepository, ReviewRepository, StudioRepository,
    UserRepository,
};
use crate::errors::ApiError;
use crate::models::{
    AdminAction, AdminStats, ArtistProfile, NewAdminAction, PageParams, Paginated, Studio,
    UserQuery, UserResponse, VerifyArtistRequest,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Which studio flag a moderation call toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioFlag {
    Verified,
    Featured,
}

impl StudioFlag {
    fn action(&self, value: bool) -> &'static str {
        match (self, value) {
            (StudioFlag::Verified, true) => "VERIFY_STUDIO",
            (StudioFlag::Verified, false) => "UNVERIFY_STUDIO",
            (StudioFlag::Featured, true) => "FEATURE_STUDIO",
            (StudioFlag::Featured, false) => "UNFEATURE_STUDIO",
        }
    }
}

pub struct AdminService;

impl AdminService {
    pub async fn record(pool: &PgPool, action: NewAdminAction) -> Result<AdminAction, ApiError> {
        AdminRepository::record(pool, &action).await
    }

    pub async fn stats(pool: &PgPool) -> Result<AdminStats, ApiError> {
        let users_by_role = AdminRepository::users_by_role(pool).await?;
        let artists_pending_verification = ArtistRepository::count_pending(pool).await?;
        let (studios_total, studios_without_coordinates, studios_geocode_failed) =
            StudioRepository::coordinate_counts(pool).await?;

        Ok(AdminStats {
            users_by_role,
            artists_pending_verification,
            studios_total,
            studios_without_coordinates,
            studios_geocode_failed,
            reviews_total: ReviewRepository::count(pool).await?,
            flash_total: FlashRepository::count(pool).await?,
        })
    }

    pub async fn list_users(pool: &PgPool, query: &UserQuery) -> Result<Paginated<UserResponse>, ApiError> {
        let page = query.page_params();
        let (users, total_count) = UserRepository::list(pool, query.role, page).await?;
        Ok(Paginated::new(
            users.iter().map(|u| u.to_response()).collect(),
            total_count,
            page,
        ))
    }

    pub async fn set_user_active(
        pool: &PgPool,
        admin_id: Uuid,
        user_id: Uuid,
        active: bool,
        reason: Option<String>,
    ) -> Result<UserResponse, ApiError> {
        if admin_id == user_id && !active {
            return Err(ApiError::BadRequest(
                "Admins cannot deactivate their own account".to_string(),
            ));
        }

        let user = UserRepository::set_active(pool, user_id, active).await?;
        Self::record(
            pool,
            NewAdminAction {
                admin_id,
                action: if active { "ACTIVATE_USER" } else { "DEACTIVATE_USER" },
                target_type: "USER",
                target_id: Some(user_id),
                reason,
                metadata: Some(json!({ "email": user.email })),
            },
        )
        .await?;
        Ok(user.to_response())
    }

    pub async fn verify_artist(
        pool: &PgPool,
        admin_id: Uuid,
        artist_id: Uuid,
        req: VerifyArtistRequest,
    ) -> Result<ArtistProfile, ApiError> {
        let profile = ArtistRepository::set_verification(pool, artist_id, req.status).await?;
        Self::record(
            pool,
            NewAdminAction {
                admin_id,
                action: "VERIFY_ARTIST",
                target_type: "ARTIST",
                target_id: Some(artist_id),
                reason: req.reason,
                metadata: Some(json!({ "status": req.status.as_str() })),
            },
        )
        .await?;
        Ok(profile)
    }

    pub async fn set_studio_flag(
        pool: &PgPool,
        admin_id: Uuid,
        studio_id: Uuid,
        flag: StudioFlag,
        value: bool,
        reason: Option<String>,
    ) -> Result<Studio, ApiError> {
        let (verified, featured) = match flag {
            StudioFlag::Verified => (Some(value), None),
            StudioFlag::Featured => (None, Some(value)),
        };
        let studio = StudioRepository::set_flags(pool, studio_id, verified, featured).await?;
        Self::record(
            pool,
            NewAdminAction {
                admin_id,
                action: flag.action(value),
                target_type: "STUDIO",
                target_id: Some(studio_id),
                reason,
                metadata: None,
            },
        )
        .await?;
        Ok(studio)
    }

    pub async fn list_actions(pool: &PgPool, page: PageParams) -> Result<Paginated<AdminAction>, ApiError> {
        let (actions, total_count) = AdminRepository::list(pool, page).await?;
        Ok(Paginated::new(actions, total_count, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_flag_actions() {
        assert_eq!(StudioFlag::Verified.action(true), "VERIFY_STUDIO");
        assert_eq!(StudioFlag::Featured.action(false), "UNFEATURE_STUDIO");
    }
}
