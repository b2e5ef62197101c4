// src/handlers/favorites.rs
// DOCUMENTATION: Client favorites; add and remove answer 200 even when nothing changed

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::models::Role;
use crate::services::FavoriteService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// GET /api/favorites
pub async fn list_favorites(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Client])?;
    let favorites = FavoriteService::list(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

/// POST /api/favorites/{artist_id}
pub async fn add_favorite(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Client])?;
    let status = FavoriteService::add(pool.get_ref(), user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "artist_id": status.artist_id,
        "is_favorite": status.is_favorite,
        "created": status.changed,
    })))
}

/// DELETE /api/favorites/{artist_id}
pub async fn remove_favorite(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Client])?;
    let status = FavoriteService::remove(pool.get_ref(), user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "artist_id": status.artist_id,
        "is_favorite": status.is_favorite,
        "removed": status.changed,
    })))
}

/// GET /api/favorites/{artist_id}
pub async fn check_favorite(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Client])?;
    let status = FavoriteService::check(pool.get_ref(), user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "is_favorite": status.is_favorite })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/favorites")
            .route("", web::get().to(list_favorites))
            .route("/{artist_id}", web::get().to(check_favorite))
            .route("/{artist_id}", web::post().to(add_favorite))
            .route("/{artist_id}", web::delete().to(remove_favorite)),
    );
}
