// src/services/geocoding_job.rs
// DOCUMENTATION: Background runner for the geocoding batch
// PURPOSE: At most one batch at a time, stoppable, with the last report kept

use crate::errors::ApiError;
use crate::services::{BatchStats, GeocodingBatch, RecordOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct JobState {
    running: bool,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    last_report: Option<BatchStats>,
    last_error: Option<String>,
}

/// Snapshot returned by GET /api/admin/geocoding/status
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub running: bool,
    pub stop_requested: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_report: Option<BatchStats>,
    pub last_error: Option<String>,
}

/// Shared through web::Data; clones point at the same job
#[derive(Clone, Default)]
pub struct GeocodingJob {
    state: Arc<RwLock<JobState>>,
    stop: Arc<AtomicBool>,
}

impl GeocodingJob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag the batch polls between records
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Take the slot; 409 while another batch or lookup holds it
    async fn claim(&self) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        if state.running {
            return Err(ApiError::Conflict(
                "A geocoding batch is already running".to_string(),
            ));
        }
        state.running = true;
        Ok(())
    }

    /// Spawn `batch` in the background
    /// DOCUMENTATION: 409 when a batch is already running
    pub async fn start(&self, batch: GeocodingBatch, limit: Option<i64>) -> Result<JobStatus, ApiError> {
        self.claim().await?;
        {
            let mut state = self.state.write().await;
            state.started_at = Some(Utc::now());
            state.finished_at = None;
            state.last_error = None;
        }
        self.stop.store(false, Ordering::SeqCst);

        let handle = tokio::spawn(async move { batch.run(limit).await });
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = handle.await;

            let mut state = state.write().await;
            state.running = false;
            state.finished_at = Some(Utc::now());
            match result {
                Ok(Ok(report)) => state.last_report = Some(report),
                Ok(Err(e)) => {
                    log::error!("Geocoding batch aborted: {}", e);
                    state.last_error = Some(e.to_string());
                }
                Err(e) => {
                    log::error!("Geocoding batch task failed: {}", e);
                    state.last_error = Some(format!("batch task failed: {}", e));
                }
            }
        });

        log::info!("Geocoding batch launched (limit {:?})", limit);
        Ok(self.status().await)
    }

    /// Geocode one studio while holding the job slot
    /// DOCUMENTATION: Lookups never overlap with a running batch
    pub async fn geocode_one(
        &self,
        batch: GeocodingBatch,
        studio_id: Uuid,
    ) -> Result<RecordOutcome, ApiError> {
        self.claim().await?;

        let lookup = tokio::spawn(async move { batch.geocode_one(studio_id).await });
        let state = self.state.clone();
        let release = tokio::spawn(async move {
            let result = lookup.await;
            state.write().await.running = false;
            result
        });

        match release.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) | Err(e) => Err(ApiError::InternalError(format!(
                "Geocoding task failed: {}",
                e
            ))),
        }
    }

    /// Ask the running batch to stop; returns false when nothing is running
    pub async fn stop(&self) -> bool {
        let running = self.state.read().await.running;
        if running {
            self.stop.store(true, Ordering::SeqCst);
            log::info!("Stop requested for geocoding batch");
        }
        running
    }

    pub async fn status(&self) -> JobStatus {
        let state = self.state.read().await;
        JobStatus {
            running: state.running,
            stop_requested: self.stop.load(Ordering::SeqCst),
            started_at: state.started_at,
            finished_at: state.finished_at,
            last_report: state.last_report.clone(),
            last_error: state.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeocodeResult;
    use crate::services::geocoding_service::testing::*;
    use crate::services::{GeocodeError, Geocoder, OutcomeStatus};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio_test::assert_ok;

    struct PanickingGeocoder;

    #[async_trait]
    impl Geocoder for PanickingGeocoder {
        async fn geocode(&self, _address: &str) -> Result<GeocodeResult, GeocodeError> {
            panic!("geocoder blew up");
        }
    }

    async fn wait_until_idle(job: &GeocodingJob) -> JobStatus {
        for _ in 0..200 {
            let status = job.status().await;
            if !status.running {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("geocoding job did not finish");
    }

    #[tokio::test]
    async fn test_single_run_and_stop() {
        let job = GeocodingJob::new();
        let gate = Arc::new(Notify::new());
        let geocoder = Arc::new(ScriptedGeocoder {
            gate: Some(gate.clone()),
            ..ScriptedGeocoder::default()
        });
        let store = Arc::new(MemoryStore::with(vec![
            studio("A", Some("1 A St"), None),
            studio("B", Some("2 B St"), None),
        ]));
        let batch = || {
            GeocodingBatch::new(
                store.clone(),
                Arc::new(MemoryCache::default()),
                geocoder.clone(),
                instant_settings(),
                job.stop_flag(),
            )
        };

        let started = assert_ok!(job.start(batch(), None).await);
        assert!(started.running);

        let second = job.start(batch(), None).await;
        assert!(matches!(second, Err(ApiError::Conflict(_))));

        for _ in 0..200 {
            if geocoder.call_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(geocoder.call_count(), 1);

        assert!(job.stop().await);
        gate.notify_one();

        let status = wait_until_idle(&job).await;
        let report = status.last_report.expect("report after run");
        assert!(report.stopped);
        assert_eq!(report.processed, 1);
        assert_eq!(report.updated, 1);
        assert!(status.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_stop_when_idle() {
        let job = GeocodingJob::new();
        assert!(!job.stop().await);

        let status = job.status().await;
        assert!(!status.running);
        assert!(!status.stop_requested);
        assert!(status.last_report.is_none());
    }

    #[tokio::test]
    async fn test_single_lookup_waits_for_batch() {
        let job = GeocodingJob::new();
        let gate = Arc::new(Notify::new());
        let geocoder = Arc::new(ScriptedGeocoder {
            gate: Some(gate.clone()),
            ..ScriptedGeocoder::default()
        });
        let target = studio("Solo", Some("9 Solo Rd"), None);
        let target_id = target.id;
        let store = Arc::new(MemoryStore::with(vec![target]));
        let batch = |geocoder: Arc<ScriptedGeocoder>| {
            GeocodingBatch::new(
                store.clone(),
                Arc::new(MemoryCache::default()),
                geocoder,
                instant_settings(),
                job.stop_flag(),
            )
        };

        assert_ok!(job.start(batch(geocoder.clone()), None).await);
        for _ in 0..200 {
            if geocoder.call_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let during = job
            .geocode_one(batch(Arc::new(ScriptedGeocoder::default())), target_id)
            .await;
        assert!(matches!(during, Err(ApiError::Conflict(_))));

        gate.notify_one();
        wait_until_idle(&job).await;

        let fresh = Arc::new(ScriptedGeocoder::default());
        let outcome = assert_ok!(job.geocode_one(batch(fresh.clone()), target_id).await);
        assert_eq!(outcome.status, OutcomeStatus::Updated);
        assert_eq!(fresh.call_count(), 1);
        assert!(!job.status().await.running);
    }

    #[tokio::test]
    async fn test_panicking_batch_releases_slot() {
        let job = GeocodingJob::new();
        let store = Arc::new(MemoryStore::with(vec![studio("Boom", Some("1 Boom St"), None)]));
        let batch = || {
            GeocodingBatch::new(
                store.clone(),
                Arc::new(MemoryCache::default()),
                Arc::new(PanickingGeocoder),
                instant_settings(),
                job.stop_flag(),
            )
        };

        assert_ok!(job.start(batch(), None).await);
        let status = wait_until_idle(&job).await;
        assert!(status.last_error.is_some());
        assert!(status.last_report.is_none());

        assert_ok!(job.start(batch(), None).await);
        wait_until_idle(&job).await;
    }
}
