// src/handlers/admin.rs
// DOCUMENTATION: Admin moderation handlers
// PURPOSE: User activation, artist verification, studio flags and the audit log

use crate::auth::AdminUser;
use crate::errors::ApiError;
use crate::models::{FlagRequest, PageParams, UserQuery, VerifyArtistRequest};
use crate::services::{AdminService, StudioFlag};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// GET /api/admin/stats
pub async fn stats(pool: web::Data<PgPool>, _admin: AdminUser) -> Result<impl Responder, ApiError> {
    let stats = AdminService::stats(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/admin/users?role=&page=&limit=
pub async fn list_users(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, ApiError> {
    let users = AdminService::list_users(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// PUT /api/admin/users/{id}/active
pub async fn set_user_active(
    pool: web::Data<PgPool>,
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<FlagRequest>,
) -> Result<impl Responder, ApiError> {
    let body = body.into_inner();
    let user = AdminService::set_user_active(
        pool.get_ref(),
        admin.user_id,
        path.into_inner(),
        body.value,
        body.reason,
    )
    .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// PUT /api/admin/artists/{id}/verification
pub async fn verify_artist(
    pool: web::Data<PgPool>,
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<VerifyArtistRequest>,
) -> Result<impl Responder, ApiError> {
    let profile = AdminService::verify_artist(
        pool.get_ref(),
        admin.user_id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn studio_flag(
    pool: &PgPool,
    admin: AdminUser,
    studio_id: Uuid,
    flag: StudioFlag,
    body: FlagRequest,
) -> Result<HttpResponse, ApiError> {
    let studio =
        AdminService::set_studio_flag(pool, admin.0.user_id, studio_id, flag, body.value, body.reason)
            .await?;
    Ok(HttpResponse::Ok().json(studio))
}

/// PUT /api/admin/studios/{id}/verified
pub async fn verify_studio(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<FlagRequest>,
) -> Result<impl Responder, ApiError> {
    studio_flag(&pool, admin, path.into_inner(), StudioFlag::Verified, body.into_inner()).await
}

/// PUT /api/admin/studios/{id}/featured
pub async fn feature_studio(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<FlagRequest>,
) -> Result<impl Responder, ApiError> {
    studio_flag(&pool, admin, path.into_inner(), StudioFlag::Featured, body.into_inner()).await
}

/// GET /api/admin/actions?page=&limit=
pub async fn list_actions(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<PageParams>,
) -> Result<impl Responder, ApiError> {
    let actions = AdminService::list_actions(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(actions))
}

/// Configure admin routes
/// DOCUMENTATION: Geocoding operations share the /api/admin scope
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/stats", web::get().to(stats))
            .route("/users", web::get().to(list_users))
            .route("/users/{id}/active", web::put().to(set_user_active))
            .route("/artists/{id}/verification", web::put().to(verify_artist))
            .route("/studios/{id}/verified", web::put().to(verify_studio))
            .route("/studios/{id}/featured", web::put().to(feature_studio))
            .route("/actions", web::get().to(list_actions))
            .configure(super::geocoding::routes),
    );
}
