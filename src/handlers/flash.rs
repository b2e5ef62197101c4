// src/handlers/flash.rs
// DOCUMENTATION: Flash gallery endpoints

use crate::auth::AuthUser;
use crate::db::FlashRepository;
use crate::errors::ApiError;
use crate::models::{CreateFlashRequest, FlashQuery, UpdateFlashRequest};
use crate::services::FlashService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /api/flash
pub async fn list_flash(
    pool: web::Data<PgPool>,
    query: web::Query<FlashQuery>,
) -> Result<impl Responder, ApiError> {
    let page = FlashService::search(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/flash/{id}
pub async fn get_flash(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let flash = FlashRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(flash.to_response()))
}

/// POST /api/flash
pub async fn create_flash(
    pool: web::Data<PgPool>,
    user: AuthUser,
    body: web::Json<CreateFlashRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    let flash = FlashService::create(pool.get_ref(), user, &body).await?;
    Ok(HttpResponse::Created().json(flash.to_response()))
}

/// PUT /api/flash/{id}
pub async fn update_flash(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateFlashRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    let flash = FlashService::update(pool.get_ref(), user, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(flash.to_response()))
}

/// DELETE /api/flash/{id}
pub async fn delete_flash(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    FlashService::delete(pool.get_ref(), user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/flash")
            .route("", web::get().to(list_flash))
            .route("", web::post().to(create_flash))
            .route("/{id}", web::get().to(get_flash))
            .route("/{id}", web::put().to(update_flash))
            .route("/{id}", web::delete().to(delete_flash)),
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
    async fn test_only_artists_post_flash() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let body = json!({ "title": "Swallow", "image_url": "https://cdn.example.com/swallow.png" });
        let req = test::TestRequest::post()
            .uri("/api/flash")
            .insert_header(testing::bearer(Role::Client))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/flash")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
