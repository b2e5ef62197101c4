// src/handlers/geocoding.rs
// DOCUMENTATION: Admin geocoding operations, mounted inside the /api/admin scope
// PURPOSE: Start, stop and inspect the batch; manage the geocode cache

use crate::auth::AdminUser;
use crate::config::Config;
use crate::db::{GeocodeCacheRepository, StudioRepository};
use crate::errors::ApiError;
use crate::models::NewAdminAction;
use crate::services::{AdminService, GeocodeCache, GeocodingBatch, GeocodingJob, PgGeocodeCache};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RunQuery {
    #[validate(range(min = 1, max = 10000))]
    pub limit: Option<i64>,
}

fn ensure_provider(config: &Config) -> Result<(), ApiError> {
    if config.google_maps_api_key.trim().is_empty() {
        return Err(ApiError::ExternalApiError(
            "Google Maps API key is not configured".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/admin/geocoding/run?limit=
/// DOCUMENTATION: Launches the batch in the background and answers 202 right away
pub async fn run_batch(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    job: web::Data<GeocodingJob>,
    AdminUser(admin): AdminUser,
    query: web::Query<RunQuery>,
) -> Result<impl Responder, ApiError> {
    query.validate()?;
    ensure_provider(&config)?;

    let batch = GeocodingBatch::from_config(pool.get_ref(), &config, job.stop_flag());
    let status = job.start(batch, query.limit).await?;
    log::info!("Admin {} started a geocoding batch", admin.user_id);

    Ok(HttpResponse::Accepted().json(status))
}

/// POST /api/admin/geocoding/stop
pub async fn stop_batch(
    job: web::Data<GeocodingJob>,
    _admin: AdminUser,
) -> Result<impl Responder, ApiError> {
    let stopped = job.stop().await;
    Ok(HttpResponse::Ok().json(json!({ "stop_requested": stopped })))
}

/// GET /api/admin/geocoding/status
pub async fn batch_status(
    job: web::Data<GeocodingJob>,
    _admin: AdminUser,
) -> Result<impl Responder, ApiError> {
    Ok(HttpResponse::Ok().json(job.status().await))
}

/// GET /api/admin/geocoding/pending?limit=
pub async fn pending(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<RunQuery>,
) -> Result<impl Responder, ApiError> {
    query.validate()?;
    let studios = StudioRepository::missing_coordinates(pool.get_ref(), query.limit).await?;
    Ok(HttpResponse::Ok().json(json!({
        "count": studios.len(),
        "studios": studios,
    })))
}

/// POST /api/admin/geocoding/studios/{id}
/// DOCUMENTATION: 409 while a batch is running
pub async fn geocode_studio(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    job: web::Data<GeocodingJob>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    ensure_provider(&config)?;
    let batch = GeocodingBatch::from_config(pool.get_ref(), &config, job.stop_flag());
    let outcome = job.geocode_one(batch, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /api/admin/geocoding/cache
pub async fn cache_stats(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<impl Responder, ApiError> {
    let cache = PgGeocodeCache::new(pool.get_ref().clone());
    let stats = cache.stats().await?;
    let recent = GeocodeCacheRepository::recent(pool.get_ref(), 20).await?;
    Ok(HttpResponse::Ok().json(json!({
        "stats": stats,
        "recent": recent,
    })))
}

/// DELETE /api/admin/geocoding/cache
pub async fn clear_cache(
    pool: web::Data<PgPool>,
    AdminUser(admin): AdminUser,
) -> Result<impl Responder, ApiError> {
    let cache = PgGeocodeCache::new(pool.get_ref().clone());
    let removed = cache.clear().await?;

    AdminService::record(
        pool.get_ref(),
        NewAdminAction {
            admin_id: admin.user_id,
            action: "CLEAR_GEOCODE_CACHE",
            target_type: "GEOCODE_CACHE",
            target_id: None,
            reason: None,
            metadata: Some(json!({ "removed": removed })),
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "removed": removed })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/geocoding/run", web::post().to(run_batch))
        .route("/geocoding/stop", web::post().to(stop_batch))
        .route("/geocoding/status", web::get().to(batch_status))
        .route("/geocoding/pending", web::get().to(pending))
        .route("/geocoding/studios/{id}", web::post().to(geocode_studio))
        .route("/geocoding/cache", web::get().to(cache_stats))
        .route("/geocoding/cache", web::delete().to(clear_cache));
}
