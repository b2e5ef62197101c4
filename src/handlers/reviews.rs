// src/handlers/reviews.rs
// DOCUMENTATION: HTTP handlers for reviews between users

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::models::{CreateReviewRequest, UpdateReviewRequest};
use crate::services::ReviewService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /api/reviews
pub async fn create_review(
    pool: web::Data<PgPool>,
    user: AuthUser,
    body: web::Json<CreateReviewRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    let review = ReviewService::create(pool.get_ref(), user, &body).await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /api/reviews/user/{user_id}
pub async fn reviews_for_user(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let reviews = ReviewService::list_for(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// PUT /api/reviews/{id}
pub async fn update_review(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateReviewRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    let review = ReviewService::update(pool.get_ref(), user, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(review))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    ReviewService::delete(pool.get_ref(), user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/reviews")
            .route("", web::post().to(create_review))
            .route("/user/{user_id}", web::get().to(reviews_for_user))
            .route("/{id}", web::put().to(update_review))
            .route("/{id}", web::delete().to(delete_review)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use crate::models::Role;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_rating_out_of_range() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/reviews")
            .insert_header(testing::bearer(Role::Client))
            .set_json(json!({ "recipient_id": Uuid::new_v4(), "rating": 9 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["details"][0]["field"], "rating");
    }

    #[actix_web::test]
    async fn test_self_review_rejected() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let me = Uuid::new_v4();
        let token = testing::keys().issue(me, Role::Artist).unwrap();
        let req = test::TestRequest::post()
            .uri("/api/reviews")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "recipient_id": me, "rating": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
