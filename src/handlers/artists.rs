// src/handlers/artists.rs
// DOCUMENTATION: Artist directory and self-service profile endpoints

use crate::auth::AuthUser;
use crate::db::{ArtistRepository, Catalog};
use crate::errors::ApiError;
use crate::models::{ArtistQuery, Role, SetCatalogRequest, UpdateArtistProfileRequest};
use crate::services::{ArtistService, MessageService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /api/artists
pub async fn list_artists(
    pool: web::Data<PgPool>,
    query: web::Query<ArtistQuery>,
) -> Result<impl Responder, ApiError> {
    let page = ArtistService::search(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/artists/{id}
pub async fn get_artist(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let artist = ArtistService::get_artist(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(artist))
}

/// GET /api/artists/{id}/messages
pub async fn artist_messages(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let messages = MessageService::list_active(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// GET /api/artists/me
pub async fn get_me(pool: web::Data<PgPool>, user: AuthUser) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Artist])?;
    let artist = ArtistService::get_own(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(artist))
}

/// PUT /api/artists/me
pub async fn update_me(
    pool: web::Data<PgPool>,
    user: AuthUser,
    body: web::Json<UpdateArtistProfileRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Artist])?;
    body.validate()?;
    let profile = ArtistService::update_own(pool.get_ref(), user.user_id, &body).await?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn set_catalog(
    pool: &PgPool,
    user: AuthUser,
    catalog: Catalog,
    body: &SetCatalogRequest,
) -> Result<HttpResponse, ApiError> {
    user.require_role(&[Role::Artist])?;
    body.validate()?;
    let items = ArtistService::set_catalog(pool, user.user_id, catalog, &body.ids).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// PUT /api/artists/me/specialties
pub async fn set_specialties(
    pool: web::Data<PgPool>,
    user: AuthUser,
    body: web::Json<SetCatalogRequest>,
) -> Result<impl Responder, ApiError> {
    set_catalog(pool.get_ref(), user, Catalog::Specialties, &body).await
}

/// PUT /api/artists/me/services
pub async fn set_services(
    pool: web::Data<PgPool>,
    user: AuthUser,
    body: web::Json<SetCatalogRequest>,
) -> Result<impl Responder, ApiError> {
    set_catalog(pool.get_ref(), user, Catalog::Services, &body).await
}

/// GET /api/artists/specialties
pub async fn list_specialties(pool: web::Data<PgPool>) -> Result<impl Responder, ApiError> {
    let items = ArtistRepository::list_catalog(pool.get_ref(), Catalog::Specialties).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// GET /api/artists/services
pub async fn list_services(pool: web::Data<PgPool>) -> Result<impl Responder, ApiError> {
    let items = ArtistRepository::list_catalog(pool.get_ref(), Catalog::Services).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// Configuration for artist routes
/// Fixed segments are registered before `/{id}`
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/artists")
            .route("", web::get().to(list_artists))
            .route("/specialties", web::get().to(list_specialties))
            .route("/services", web::get().to(list_services))
            .route("/me", web::get().to(get_me))
            .route("/me", web::put().to(update_me))
            .route("/me/specialties", web::put().to(set_specialties))
            .route("/me/services", web::put().to(set_services))
            .route("/{id}", web::get().to(get_artist))
            .route("/{id}/messages", web::get().to(artist_messages)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_profile_update_is_artist_only() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::put()
            .uri("/api/artists/me")
            .insert_header(testing::bearer(Role::Client))
            .set_json(json!({ "bio": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri("/api/artists/me")
            .set_json(json!({ "bio": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_profile_update_validates_before_saving() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::put()
            .uri("/api/artists/me")
            .insert_header(testing::bearer(Role::Artist))
            .set_json(json!({ "website": "not a url", "min_price": -5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_invalid_artist_id_is_bad_request() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::get().uri("/api/artists/not-a-uuid").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
