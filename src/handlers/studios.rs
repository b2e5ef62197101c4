// src/handlers/studios.rs
// DOCUMENTATION: HTTP handlers for studio operations
// PURPOSE: Directory, map, nearby search and owner-managed membership

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::models::{
    AddStudioArtistRequest, CreateStudioRequest, NearbyQuery, Role, StudioQuery,
    UpdateStudioRequest,
};
use crate::services::StudioService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /api/studios
pub async fn list_studios(
    pool: web::Data<PgPool>,
    query: web::Query<StudioQuery>,
) -> Result<impl Responder, ApiError> {
    let page = StudioService::search(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/studios/{id}
pub async fn get_studio(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let studio = StudioService::get_studio(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(studio))
}

/// POST /api/studios
pub async fn create_studio(
    pool: web::Data<PgPool>,
    user: AuthUser,
    body: web::Json<CreateStudioRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Artist, Role::Admin])?;
    body.validate()?;
    let studio = StudioService::create(pool.get_ref(), user, &body).await?;
    Ok(HttpResponse::Created().json(studio))
}

/// PUT /api/studios/{id}
pub async fn update_studio(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStudioRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    let studio = StudioService::update(pool.get_ref(), user, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(studio))
}

/// DELETE /api/studios/{id}
pub async fn delete_studio(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    StudioService::delete(pool.get_ref(), user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/studios/{id}/artists
pub async fn add_artist(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<AddStudioArtistRequest>,
) -> Result<impl Responder, ApiError> {
    let artists = StudioService::add_artist(pool.get_ref(), user, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(artists))
}

/// DELETE /api/studios/{id}/artists/{artist_id}
pub async fn remove_artist(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, ApiError> {
    let (studio_id, artist_id) = path.into_inner();
    StudioService::remove_artist(pool.get_ref(), user, studio_id, artist_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/studios/map
/// GeoJSON FeatureCollection of geocoded studios
pub async fn studio_map(pool: web::Data<PgPool>) -> Result<impl Responder, ApiError> {
    let collection = StudioService::map(pool.get_ref()).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .json(collection))
}

/// GET /api/studios/nearby?lat=&lng=&radius_km=
pub async fn nearby_studios(
    pool: web::Data<PgPool>,
    query: web::Query<NearbyQuery>,
) -> Result<impl Responder, ApiError> {
    query.validate()?;
    let studios = StudioService::nearby(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(studios))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/studios")
            .route("", web::get().to(list_studios))
            .route("", web::post().to(create_studio))
            .route("/map", web::get().to(studio_map))
            .route("/nearby", web::get().to(nearby_studios))
            .route("/{id}", web::get().to(get_studio))
            .route("/{id}", web::put().to(update_studio))
            .route("/{id}", web::delete().to(delete_studio))
            .route("/{id}/artists", web::post().to(add_artist))
            .route("/{id}/artists/{artist_id}", web::delete().to(remove_artist)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_clients_cannot_create_studios() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/studios")
            .insert_header(testing::bearer(Role::Client))
            .set_json(json!({ "name": "Black Rose" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_nearby_rejects_out_of_range_coordinates() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::get()
            .uri("/api/studios/nearby?lat=123.0&lng=10.0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["details"][0]["field"], "lat");
    }

    #[actix_web::test]
    async fn test_nearby_requires_coordinates() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::get().uri("/api/studios/nearby").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
