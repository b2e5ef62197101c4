// src/models/studio.rs
// DOCUMENTATION: Studio records, membership and map/search DTOs
// PURPOSE: Database rows and request/response types for /api/studios

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::PageParams;

/// Represents a complete studio record from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Studio {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
    /// Filled by the geocoding batch
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_verified: bool,
    pub is_featured: bool,
    pub owner_id: Option<Uuid>,
    /// FAILED when the last geocoding attempt did not produce coordinates
    pub geocode_status: Option<String>,
    pub geocode_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Studio {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Artist membership entry shown on a studio page
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StudioArtist {
    pub artist_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub is_verified: bool,
    pub joined_at: DateTime<Utc>,
}

/// GET /api/studios/{id}
#[derive(Debug, Serialize)]
pub struct StudioDetailResponse {
    #[serde(flatten)]
    pub studio: Studio,
    pub artists: Vec<StudioArtist>,
}

/// Studio plus its distance from the search origin
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NearbyStudio {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub studio: Studio,
    pub distance_km: f64,
}

/// POST /api/studios
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudioRequest {
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,
    #[validate(length(max = 100))]
    pub instagram: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// PUT /api/studios/{id}
/// All fields are optional - only provided fields are updated
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStudioRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,
    #[validate(length(max = 100))]
    pub instagram: Option<String>,
}

impl UpdateStudioRequest {
    /// Any change to the address means the stored coordinates are stale
    pub fn touches_address(&self) -> bool {
        self.address.is_some()
            || self.city.is_some()
            || self.state.is_some()
            || self.zip_code.is_some()
            || self.country.is_some()
    }
}

/// POST /api/studios/{id}/artists
#[derive(Debug, Deserialize)]
pub struct AddStudioArtistRequest {
    pub artist_id: Uuid,
    pub role: Option<String>,
}

/// Query string for GET /api/studios
#[derive(Debug, Default, Deserialize)]
pub struct StudioQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub verified: Option<bool>,
    pub featured: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl StudioQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Query string for GET /api/studios/nearby
#[derive(Debug, Deserialize, Validate)]
pub struct NearbyQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    /// Search radius in kilometers (default 25, max 500)
    #[validate(range(min = 0.1, max = 500.0))]
    pub radius_km: Option<f64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touches_address() {
        let mut req = UpdateStudioRequest {
            name: Some("Black Rose".to_string()),
            description: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            phone: None,
            email: None,
            website: None,
            instagram: None,
        };
        assert!(!req.touches_address());

        req.zip_code = Some("90210".to_string());
        assert!(req.touches_address());
    }

    #[test]
    fn test_nearby_query_bounds() {
        let query = NearbyQuery {
            lat: 95.0,
            lng: 10.0,
            radius_km: Some(10.0),
            limit: None,
        };
        assert!(query.validate().is_err());
    }
}
