// src/services/review_service.rs
// DOCUMENTATION: Review rules: one per author/recipient pair, never about yourself

use crate::auth::AuthUser;
use crate::db::{ReviewRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{
    CreateReviewRequest, NewAdminAction, Review, ReviewListResponse, UpdateReviewRequest,
};
use crate::services::AdminService;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ReviewService;

impl ReviewService {
    pub async fn create(
        pool: &PgPool,
        caller: AuthUser,
        req: &CreateReviewRequest,
    ) -> Result<Review, ApiError> {
        if req.recipient_id == caller.user_id {
            return Err(ApiError::BadRequest("You cannot review yourself".to_string()));
        }
        UserRepository::get_by_id(pool, req.recipient_id).await?;

        let review = ReviewRepository::create_review(pool, caller.user_id, req).await?;
        log::info!(
            "User {} reviewed {} ({} stars)",
            caller.user_id,
            req.recipient_id,
            review.rating
        );
        Ok(review)
    }

    pub async fn list_for(pool: &PgPool, recipient_id: Uuid) -> Result<ReviewListResponse, ApiError> {
        let summary = ReviewRepository::summary_for(pool, recipient_id).await?;
        let reviews = ReviewRepository::get_reviews_for(pool, recipient_id).await?;
        Ok(ReviewListResponse { summary, reviews })
    }

    pub async fn update(
        pool: &PgPool,
        caller: AuthUser,
        id: Uuid,
        req: &UpdateReviewRequest,
    ) -> Result<Review, ApiError> {
        let review = ReviewRepository::get_by_id(pool, id).await?;
        if review.author_id != caller.user_id {
            return Err(ApiError::Forbidden("only the author may edit a review".to_string()));
        }
        ReviewRepository::update_review(pool, id, req).await
    }

    /// Author, or an admin (audited)
    pub async fn delete(pool: &PgPool, caller: AuthUser, id: Uuid) -> Result<(), ApiError> {
        let review = ReviewRepository::get_by_id(pool, id).await?;
        let is_author = review.author_id == caller.user_id;
        if !is_author && !caller.is_admin() {
            return Err(ApiError::Forbidden("only the author may delete a review".to_string()));
        }

        ReviewRepository::delete_review(pool, id).await?;

        if !is_author {
            AdminService::record(
                pool,
                NewAdminAction {
                    admin_id: caller.user_id,
                    action: "DELETE_REVIEW",
                    target_type: "REVIEW",
                    target_id: Some(id),
                    reason: None,
                    metadata: Some(json!({
                        "author_id": review.author_id,
                        "recipient_id": review.recipient_id,
                        "rating": review.rating,
                    })),
                },
            )
            .await?;
        }
        Ok(())
    }
}
