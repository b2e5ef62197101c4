// src/services/cache.rs
// DOCUMENTATION: Address -> coordinates cache for the geocoding batch
// PURPOSE: Avoid repeat lookups for addresses already resolved

use crate::db::GeocodeCacheRepository;
use crate::errors::ApiError;
use crate::models::{CacheStats, GeocodeResult};
use async_trait::async_trait;
use sqlx::PgPool;

/// Cache key for an address: trimmed, lowercased, inner whitespace collapsed
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Only successful lookups are stored
#[async_trait]
pub trait GeocodeCache: Send + Sync {
    async fn get(&self, address: &str) -> Result<Option<GeocodeResult>, ApiError>;
    async fn put(&self, address: &str, result: &GeocodeResult) -> Result<(), ApiError>;
    async fn clear(&self) -> Result<u64, ApiError>;
    async fn stats(&self) -> Result<CacheStats, ApiError>;
}

/// Cache backed by the geocode_cache table
#[derive(Clone)]
pub struct PgGeocodeCache {
    pool: PgPool,
}

impl PgGeocodeCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeocodeCache for PgGeocodeCache {
    async fn get(&self, address: &str) -> Result<Option<GeocodeResult>, ApiError> {
        let key = normalize_address(address);
        let hit = GeocodeCacheRepository::get(&self.pool, &key).await?;
        if hit.is_some() {
            log::debug!("Geocode cache HIT for '{}'", key);
        } else {
            log::debug!("Geocode cache MISS for '{}'", key);
        }
        Ok(hit)
    }

    async fn put(&self, address: &str, result: &GeocodeResult) -> Result<(), ApiError> {
        GeocodeCacheRepository::put(&self.pool, &normalize_address(address), result).await
    }

    async fn clear(&self) -> Result<u64, ApiError> {
        GeocodeCacheRepository::clear(&self.pool).await
    }

    async fn stats(&self) -> Result<CacheStats, ApiError> {
        GeocodeCacheRepository::stats(&self.pool).await
    }
}
