// src/services/geocoding_service.rs
// DOCUMENTATION: Geocoding batch for studios without coordinates
// PURPOSE: Resolve addresses one record at a time, paced, with 429 retries

use crate::config::{Config, GeocodingSettings};
use crate::db::StudioRepository;
use crate::errors::ApiError;
use crate::models::{GeocodeResult, StudioAddress};
use crate::services::{
    GeocodeCache, GeocodeError, Geocoder, GoogleGeocodingClient, PgGeocodeCache,
};
use async_trait::async_trait;
use chrono::Utc;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Studio persistence used by the batch
#[async_trait]
pub trait StudioStore: Send + Sync {
    /// Studios missing latitude or longitude, oldest first with failed ones last
    async fn pending(&self, limit: Option<i64>) -> Result<Vec<StudioAddress>, ApiError>;
    async fn address_of(&self, id: Uuid) -> Result<StudioAddress, ApiError>;
    async fn save_coordinates(&self, id: Uuid, result: &GeocodeResult) -> Result<(), ApiError>;
    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<(), ApiError>;
}

pub struct PgStudioStore {
    pool: PgPool,
}

impl PgStudioStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudioStore for PgStudioStore {
    async fn pending(&self, limit: Option<i64>) -> Result<Vec<StudioAddress>, ApiError> {
        StudioRepository::missing_coordinates(&self.pool, limit).await
    }

    async fn address_of(&self, id: Uuid) -> Result<StudioAddress, ApiError> {
        StudioRepository::address_of(&self.pool, id).await
    }

    async fn save_coordinates(&self, id: Uuid, result: &GeocodeResult) -> Result<(), ApiError> {
        StudioRepository::save_coordinates(&self.pool, id, result).await
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<(), ApiError> {
        StudioRepository::mark_geocode_failed(&self.pool, id, reason).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Updated,
    Skipped,
    Failed,
}

/// What happened to one studio during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub studio_id: Uuid,
    pub name: String,
    pub status: OutcomeStatus,
    pub address: Option<String>,
    pub from_cache: bool,
    pub message: Option<String>,
}

impl RecordOutcome {
    fn for_studio(studio: &StudioAddress) -> Self {
        Self {
            studio_id: studio.id,
            name: studio.name.clone(),
            status: OutcomeStatus::Skipped,
            address: None,
            from_cache: false,
            message: None,
        }
    }

    fn skipped(mut self, reason: &str) -> Self {
        self.status = OutcomeStatus::Skipped;
        self.message = Some(reason.to_string());
        self
    }

    fn updated(mut self) -> Self {
        self.status = OutcomeStatus::Updated;
        self
    }
}

/// Batch statistics
/// DOCUMENTATION: Report returned by a run and kept by the job for status queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStats {
    /// Records looked at (skipped ones included)
    pub processed: u32,
    pub updated: u32,
    pub cache_hits: u32,
    /// External lookups issued, retries included
    pub api_requests: u32,
    pub skipped: u32,
    pub failed: u32,
    pub rate_limit_retries: u32,
    /// True when the stop flag ended the run early
    pub stopped: bool,
    pub outcomes: Vec<RecordOutcome>,
    pub duration_ms: u64,
    pub started_at: String,
    pub completed_at: Option<String>,
}

impl BatchStats {
    pub fn new() -> Self {
        Self {
            processed: 0,
            updated: 0,
            cache_hits: 0,
            api_requests: 0,
            skipped: 0,
            failed: 0,
            rate_limit_retries: 0,
            stopped: false,
            outcomes: Vec::new(),
            duration_ms: 0,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }

    fn record(&mut self, outcome: RecordOutcome) {
        self.processed += 1;
        match outcome.status {
            OutcomeStatus::Updated => self.updated += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed => self.failed += 1,
        }
        if outcome.from_cache {
            self.cache_hits += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn complete(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.completed_at = Some(Utc::now().to_rfc3339());
    }
}

impl Default for BatchStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Geocoding batch
/// DOCUMENTATION: Sequential, no global transaction; each record commits on its own
pub struct GeocodingBatch {
    store: Arc<dyn StudioStore>,
    cache: Arc<dyn GeocodeCache>,
    geocoder: Arc<dyn Geocoder>,
    settings: GeocodingSettings,
    stop: Arc<AtomicBool>,
}

impl GeocodingBatch {
    pub fn new(
        store: Arc<dyn StudioStore>,
        cache: Arc<dyn GeocodeCache>,
        geocoder: Arc<dyn Geocoder>,
        settings: GeocodingSettings,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            cache,
            geocoder,
            settings,
            stop,
        }
    }

    /// Batch wired to PostgreSQL and the Google Geocoding API
    pub fn from_config(pool: &PgPool, config: &Config, stop: Arc<AtomicBool>) -> Self {
        Self::new(
            Arc::new(PgStudioStore::new(pool.clone())),
            Arc::new(PgGeocodeCache::new(pool.clone())),
            Arc::new(GoogleGeocodingClient::new(config.google_maps_api_key.clone())),
            config.geocoding.clone(),
            stop,
        )
    }

    /// Geocode every pending studio, up to `limit`
    /// DOCUMENTATION: The stop flag is checked before every record
    pub async fn run(&self, limit: Option<i64>) -> Result<BatchStats, ApiError> {
        let start_time = Instant::now();
        let mut stats = BatchStats::new();

        let studios = self.store.pending(limit).await?;
        log::info!(
            "Geocoding batch started: {} studios pending (delay {:?}, max retries {})",
            studios.len(),
            self.settings.delay,
            self.settings.max_retries
        );

        let pacer = self.pacer();

        for (idx, studio) in studios.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                log::warn!(
                    "Geocoding batch stopped after {}/{} studios",
                    idx,
                    studios.len()
                );
                stats.stopped = true;
                break;
            }

            log::debug!(
                "Geocoding {}/{}: {} ({})",
                idx + 1,
                studios.len(),
                studio.name,
                studio.id
            );
            let outcome = self.process(studio, pacer.as_ref(), &mut stats).await;
            stats.record(outcome);
        }

        stats.complete(start_time.elapsed().as_millis() as u64);

        log::info!(
            "Geocoding batch finished: {} updated ({} from cache), {} skipped, {} failed, {} API requests in {}ms",
            stats.updated,
            stats.cache_hits,
            stats.skipped,
            stats.failed,
            stats.api_requests,
            stats.duration_ms
        );

        Ok(stats)
    }

    /// Geocode a single studio right away, ignoring the stop flag
    pub async fn geocode_one(&self, studio_id: Uuid) -> Result<RecordOutcome, ApiError> {
        let studio = self.store.address_of(studio_id).await?;
        let mut stats = BatchStats::new();
        Ok(self.process(&studio, None, &mut stats).await)
    }

    /// One external call per `delay`; `None` when the delay is zero
    fn pacer(&self) -> Option<DefaultDirectRateLimiter> {
        Quota::with_period(self.settings.delay).map(RateLimiter::direct)
    }

    async fn process(
        &self,
        studio: &StudioAddress,
        pacer: Option<&DefaultDirectRateLimiter>,
        stats: &mut BatchStats,
    ) -> RecordOutcome {
        let mut outcome = RecordOutcome::for_studio(studio);

        if studio.has_coordinates() {
            return outcome.skipped("already has coordinates");
        }

        let Some(address) = studio.compose() else {
            return self.fail(studio, outcome, "address is empty").await;
        };
        outcome.address = Some(address.clone());

        match self.cache.get(&address).await {
            Ok(Some(hit)) => {
                outcome.from_cache = true;
                return match self.store.save_coordinates(studio.id, &hit).await {
                    Ok(()) => outcome.updated(),
                    Err(e) => {
                        let reason = format!("could not save coordinates: {}", e);
                        self.fail(studio, outcome, &reason).await
                    }
                };
            }
            Ok(None) => {}
            Err(e) => log::warn!("Geocode cache lookup failed for {}: {}", studio.name, e),
        }

        let mut retries = 0;
        loop {
            match self.lookup_and_save(studio, &address, pacer, stats).await {
                Ok(()) => return outcome.updated(),
                Err(GeocodeError::RateLimited) if retries < self.settings.max_retries => {
                    retries += 1;
                    stats.rate_limit_retries += 1;
                    log::warn!(
                        "Rate limited while geocoding {}, retry {}/{} in {:?}",
                        studio.name,
                        retries,
                        self.settings.max_retries,
                        self.settings.retry_delay
                    );
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(e) => return self.fail(studio, outcome, &e.to_string()).await,
            }
        }
    }

    async fn lookup_and_save(
        &self,
        studio: &StudioAddress,
        address: &str,
        pacer: Option<&DefaultDirectRateLimiter>,
        stats: &mut BatchStats,
    ) -> Result<(), GeocodeError> {
        if let Some(pacer) = pacer {
            pacer.until_ready().await;
        }

        stats.api_requests += 1;
        let result = self.geocoder.geocode(address).await?;

        if let Err(e) = self.cache.put(address, &result).await {
            log::warn!("Could not cache geocode for '{}': {}", address, e);
        }

        self.store
            .save_coordinates(studio.id, &result)
            .await
            .map_err(|e| GeocodeError::RequestFailed(format!("could not save coordinates: {}", e)))?;

        log::info!(
            "Geocoded {} -> ({}, {})",
            studio.name,
            result.latitude,
            result.longitude
        );
        Ok(())
    }

    async fn fail(
        &self,
        studio: &StudioAddress,
        mut outcome: RecordOutcome,
        reason: &str,
    ) -> RecordOutcome {
        log::warn!("Geocoding failed for {} ({}): {}", studio.name, studio.id, reason);
        if let Err(e) = self.store.mark_failed(studio.id, reason).await {
            log::error!("Could not record geocoding failure for {}: {}", studio.id, e);
        }
        outcome.status = OutcomeStatus::Failed;
        outcome.message = Some(reason.to_string());
        outcome
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory doubles shared by the batch and job tests

    use super::*;
    use crate::models::CacheStats;
    use crate::services::normalize_address;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    pub struct MemoryStore {
        pub studios: Mutex<Vec<StudioAddress>>,
        pub saved: Mutex<Vec<(Uuid, GeocodeResult)>>,
        pub failed: Mutex<Vec<(Uuid, String)>>,
    }

    impl MemoryStore {
        pub fn with(studios: Vec<StudioAddress>) -> Self {
            Self {
                studios: Mutex::new(studios),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl StudioStore for MemoryStore {
        async fn pending(&self, limit: Option<i64>) -> Result<Vec<StudioAddress>, ApiError> {
            let studios = self.studios.lock().unwrap().clone();
            let limit = limit.unwrap_or(i64::MAX) as usize;
            Ok(studios.into_iter().take(limit).collect())
        }

        async fn address_of(&self, id: Uuid) -> Result<StudioAddress, ApiError> {
            self.studios
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("Studio {}", id)))
        }

        async fn save_coordinates(&self, id: Uuid, result: &GeocodeResult) -> Result<(), ApiError> {
            self.saved.lock().unwrap().push((id, result.clone()));
            Ok(())
        }

        async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<(), ApiError> {
            self.failed.lock().unwrap().push((id, reason.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryCache {
        pub entries: Mutex<HashMap<String, GeocodeResult>>,
    }

    #[async_trait]
    impl GeocodeCache for MemoryCache {
        async fn get(&self, address: &str) -> Result<Option<GeocodeResult>, ApiError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(&normalize_address(address))
                .cloned())
        }

        async fn put(&self, address: &str, result: &GeocodeResult) -> Result<(), ApiError> {
            self.entries
                .lock()
                .unwrap()
                .insert(normalize_address(address), result.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<u64, ApiError> {
            let mut entries = self.entries.lock().unwrap();
            let count = entries.len() as u64;
            entries.clear();
            Ok(count)
        }

        async fn stats(&self) -> Result<CacheStats, ApiError> {
            Ok(CacheStats {
                total_entries: self.entries.lock().unwrap().len() as i64,
                oldest_entry: None,
                newest_entry: None,
            })
        }
    }

    /// Replays canned responses in order; answers OK once the script runs out
    #[derive(Default)]
    pub struct ScriptedGeocoder {
        pub script: Mutex<VecDeque<Result<GeocodeResult, GeocodeError>>>,
        pub calls: Mutex<Vec<String>>,
        /// When set, every lookup waits for a notification after being recorded
        pub gate: Option<Arc<Notify>>,
    }

    impl ScriptedGeocoder {
        pub fn with(script: Vec<Result<GeocodeResult, GeocodeError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
            self.calls.lock().unwrap().push(address.to_string());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(point(1.0, 2.0)))
        }
    }

    pub fn point(latitude: f64, longitude: f64) -> GeocodeResult {
        GeocodeResult {
            latitude,
            longitude,
            formatted_address: None,
            place_id: None,
        }
    }

    pub fn studio(name: &str, street: Option<&str>, coordinates: Option<(f64, f64)>) -> StudioAddress {
        StudioAddress {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: street.map(str::to_string),
            city: street.map(|_| "Austin".to_string()),
            state: street.map(|_| "TX".to_string()),
            zip_code: None,
            country: street.map(|_| "USA".to_string()),
            latitude: coordinates.map(|c| c.0),
            longitude: coordinates.map(|c| c.1),
        }
    }

    pub fn instant_settings() -> GeocodingSettings {
        GeocodingSettings {
            delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            max_retries: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    struct Harness {
        store: Arc<MemoryStore>,
        cache: Arc<MemoryCache>,
        geocoder: Arc<ScriptedGeocoder>,
        stop: Arc<AtomicBool>,
        batch: GeocodingBatch,
    }

    fn harness(studios: Vec<StudioAddress>, script: Vec<Result<GeocodeResult, GeocodeError>>) -> Harness {
        let store = Arc::new(MemoryStore::with(studios));
        let cache = Arc::new(MemoryCache::default());
        let geocoder = Arc::new(ScriptedGeocoder::with(script));
        let stop = Arc::new(AtomicBool::new(false));
        let batch = GeocodingBatch::new(
            store.clone(),
            cache.clone(),
            geocoder.clone(),
            instant_settings(),
            stop.clone(),
        );
        Harness {
            store,
            cache,
            geocoder,
            stop,
            batch,
        }
    }

    #[tokio::test]
    async fn test_skips_studios_with_coordinates() {
        let located = studio("Located", Some("1 First St"), Some((30.0, -97.0)));
        let pending = studio("Pending", Some("2 Second St"), None);
        let h = harness(vec![located.clone(), pending.clone()], vec![Ok(point(30.1, -97.1))]);

        let stats = h.batch.run(None).await.unwrap();

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.api_requests, 1);
        assert_eq!(h.geocoder.call_count(), 1);

        let saved = h.store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, pending.id);
        assert_eq!(stats.outcomes[0].status, OutcomeStatus::Skipped);
    }

    #[tokio::test]
    async fn test_retries_once_after_rate_limit() {
        let pending = studio("Ink House", Some("9 Congress Ave"), None);
        let h = harness(
            vec![pending.clone()],
            vec![Err(GeocodeError::RateLimited), Ok(point(30.26, -97.74))],
        );

        let stats = h.batch.run(None).await.unwrap();

        assert_eq!(stats.updated, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.rate_limit_retries, 1);
        assert_eq!(stats.api_requests, 2);
        assert_eq!(h.geocoder.call_count(), 2);
        assert_eq!(h.store.saved.lock().unwrap()[0].1, point(30.26, -97.74));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let pending = studio("Ink House", Some("9 Congress Ave"), None);
        let h = harness(
            vec![pending.clone()],
            vec![Err(GeocodeError::RateLimited), Err(GeocodeError::RateLimited)],
        );

        let stats = h.batch.run(None).await.unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.rate_limit_retries, 1);
        assert_eq!(h.geocoder.call_count(), 2);
        assert!(h.store.saved.lock().unwrap().is_empty());

        let failed = h.store.failed.lock().unwrap();
        assert_eq!(failed[0].0, pending.id);
        assert!(failed[0].1.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_lookup() {
        let pending = studio("Cached", Some("5 Lamar Blvd"), None);
        let h = harness(vec![pending.clone()], vec![]);
        let address = pending.compose().unwrap();
        h.cache
            .put(&address.to_uppercase(), &point(10.0, 20.0))
            .await
            .unwrap();

        let stats = h.batch.run(None).await.unwrap();

        assert_eq!(stats.updated, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.api_requests, 0);
        assert_eq!(h.geocoder.call_count(), 0);
        assert!(stats.outcomes[0].from_cache);
    }

    #[tokio::test]
    async fn test_only_successes_are_cached() {
        let found = studio("Found", Some("1 Found Rd"), None);
        let lost = studio("Lost", Some("1 Nowhere Rd"), None);
        let h = harness(
            vec![found.clone(), lost.clone()],
            vec![Ok(point(1.5, 2.5)), Err(GeocodeError::NotFound)],
        );

        let stats = h.batch.run(None).await.unwrap();

        assert_eq!(stats.updated, 1);
        assert_eq!(stats.failed, 1);
        let entries = h.cache.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(&normalize_key(&found)));
    }

    fn normalize_key(studio: &StudioAddress) -> String {
        crate::services::normalize_address(&studio.compose().unwrap())
    }

    #[tokio::test]
    async fn test_empty_address_fails_without_lookup() {
        let blank = studio("Nameless", None, None);
        let h = harness(vec![blank.clone()], vec![]);

        let stats = h.batch.run(None).await.unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(h.geocoder.call_count(), 0);
        assert_eq!(h.store.failed.lock().unwrap()[0].1, "address is empty");
    }

    #[tokio::test]
    async fn test_stop_flag_halts_before_next_record() {
        let h = harness(
            vec![
                studio("A", Some("1 A St"), None),
                studio("B", Some("2 B St"), None),
            ],
            vec![],
        );
        h.stop.store(true, Ordering::SeqCst);

        let stats = h.batch.run(None).await.unwrap();

        assert!(stats.stopped);
        assert_eq!(stats.processed, 0);
        assert_eq!(h.geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_limit_and_geocode_one() {
        let first = studio("First", Some("1 A St"), None);
        let second = studio("Second", Some("2 B St"), None);
        let h = harness(vec![first.clone(), second.clone()], vec![]);

        let stats = h.batch.run(Some(1)).await.unwrap();
        assert_eq!(stats.processed, 1);

        let outcome = h.batch.geocode_one(second.id).await.unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Updated);
        assert_eq!(outcome.studio_id, second.id);

        let missing = h.batch.geocode_one(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_zero_delay_disables_pacing() {
        let h = harness(vec![], vec![]);
        assert!(h.batch.pacer().is_none());
    }
}
