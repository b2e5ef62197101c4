// src/models/artist.rs
// DOCUMENTATION: Artist profiles and their specialty/service catalogs
// PURPOSE: Database rows and DTOs for /api/artists

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{FlashResponse, PageParams, RatingSummary};

/// Row of artist_profiles joined with the owning user's name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ArtistProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Display name taken from users.name
    pub name: String,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub hourly_rate: Option<f64>,
    pub min_price: Option<f64>,
    pub instagram: Option<String>,
    pub website: Option<String>,
    pub profile_image: Option<String>,
    pub is_verified: bool,
    pub verification_status: String,
    pub studio_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Directory listing entry with aggregated rating
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ArtistListItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub min_price: Option<f64>,
    pub profile_image: Option<String>,
    pub is_verified: bool,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub specialties: Vec<String>,
}

/// Entry of the specialty or service catalog
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CatalogItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// GET /api/artists/{id}
#[derive(Debug, Serialize)]
pub struct ArtistDetailResponse {
    #[serde(flatten)]
    pub profile: ArtistProfile,
    pub specialties: Vec<CatalogItem>,
    pub services: Vec<CatalogItem>,
    pub rating: RatingSummary,
    pub flash_count: i64,
    pub recent_flash: Vec<FlashResponse>,
}

/// Verification state of an artist profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Approved => "APPROVED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }

    /// Only approved profiles carry the verified badge
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationStatus::Approved)
    }
}

/// PUT /api/artists/me
/// All fields are optional - only provided fields are updated
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArtistProfileRequest {
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub hourly_rate: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub min_price: Option<f64>,
    #[validate(length(max = 100))]
    pub instagram: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub profile_image: Option<String>,
}

/// Replace the full set of specialties or services
#[derive(Debug, Deserialize, Validate)]
pub struct SetCatalogRequest {
    #[validate(length(max = 20, message = "at most 20 entries"))]
    pub ids: Vec<Uuid>,
}

/// Query string for GET /api/artists
#[derive(Debug, Default, Deserialize)]
pub struct ArtistQuery {
    /// Case-insensitive match on name or bio
    pub q: Option<String>,
    pub city: Option<String>,
    /// Specialty name
    pub specialty: Option<String>,
    pub verified: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ArtistQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_status() {
        assert!(VerificationStatus::Approved.is_verified());
        assert!(!VerificationStatus::Rejected.is_verified());
        let parsed: VerificationStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed.as_str(), "PENDING");
    }

    #[test]
    fn test_profile_update_rejects_negative_price() {
        let req = UpdateArtistProfileRequest {
            bio: None,
            city: None,
            state: None,
            country: None,
            hourly_rate: Some(-10.0),
            min_price: None,
            instagram: None,
            website: Some("https://ink.example.com".to_string()),
            profile_image: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("hourly_rate"));
        assert!(!errors.field_errors().contains_key("website"));
    }
}
