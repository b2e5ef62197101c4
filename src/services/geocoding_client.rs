// src/services/geocoding_client.rs
// DOCUMENTATION: Google Geocoding API client
// PURPOSE: Resolve a postal address to coordinates for the geocoding batch

use crate::models::GeocodeResult;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Failure modes of a single lookup
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeocodeError {
    /// ZERO_RESULTS: the address does not resolve
    #[error("address not found")]
    NotFound,

    /// OVER_QUERY_LIMIT or HTTP 429
    #[error("rate limited by geocoding provider")]
    RateLimited,

    #[error("geocoding request failed: {0}")]
    RequestFailed(String),
}

/// Address lookup seam used by the batch
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodeError>;
}

/// Response from the Geocoding API
#[derive(Debug, Deserialize)]
pub struct GeocodeApiResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeApiResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeApiResult {
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
    pub geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeGeometry {
    pub location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeLocation {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeApiResponse {
    /// Map the provider status onto a lookup outcome
    pub fn into_result(self) -> Result<GeocodeResult, GeocodeError> {
        match self.status.as_str() {
            "OK" => {
                let first = self.results.into_iter().next().ok_or(GeocodeError::NotFound)?;
                Ok(GeocodeResult {
                    latitude: first.geometry.location.lat,
                    longitude: first.geometry.location.lng,
                    formatted_address: first.formatted_address,
                    place_id: first.place_id,
                })
            }
            "ZERO_RESULTS" => Err(GeocodeError::NotFound),
            "OVER_QUERY_LIMIT" => Err(GeocodeError::RateLimited),
            other => Err(GeocodeError::RequestFailed(
                self.error_message
                    .unwrap_or_else(|| format!("Unexpected status: {}", other)),
            )),
        }
    }
}

/// Google Geocoding API client
/// DOCUMENTATION: One HTTP request per lookup, no internal retries
pub struct GoogleGeocodingClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocodingClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocodingClient {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        if self.api_key.is_empty() {
            return Err(GeocodeError::RequestFailed(
                "GOOGLE_MAPS_API_KEY is not configured".to_string(),
            ));
        }

        log::debug!("Geocoding lookup: {}", address);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Geocoding request failed: {}", e);
                GeocodeError::RequestFailed(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            log::warn!("Geocoding provider answered 429 for '{}'", address);
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Geocoding API error {}: {}", status, body);
            return Err(GeocodeError::RequestFailed(format!("API error {}", status)));
        }

        let api_response: GeocodeApiResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse geocoding response: {}", e);
            GeocodeError::RequestFailed(format!("Parse error: {}", e))
        })?;

        api_response.into_result()
    }
}
