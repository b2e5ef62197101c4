// src/models/geocode.rs
// DOCUMENTATION: Geocoding results, cache rows and pending-studio projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Coordinates resolved for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
}

/// Address fields of a studio, as needed by the geocoder
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StudioAddress {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StudioAddress {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Full address string: "street, city, state zip, country"
    /// Blank parts are dropped; `None` when nothing is left.
    pub fn compose(&self) -> Option<String> {
        fn clean(part: &Option<String>) -> Option<&str> {
            part.as_deref().map(str::trim).filter(|p| !p.is_empty())
        }

        let region = match (clean(&self.state), clean(&self.zip_code)) {
            (Some(state), Some(zip)) => Some(format!("{} {}", state, zip)),
            (Some(state), None) => Some(state.to_string()),
            (None, Some(zip)) => Some(zip.to_string()),
            (None, None) => None,
        };

        let parts: Vec<String> = [
            clean(&self.address).map(str::to_string),
            clean(&self.city).map(str::to_string),
            region,
            clean(&self.country).map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Cached lookup row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GeocodeCacheEntry {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CacheStats {
    pub total_entries: i64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(parts: [Option<&str>; 5]) -> StudioAddress {
        let [address, city, state, zip_code, country] = parts.map(|p| p.map(str::to_string));
        StudioAddress {
            id: Uuid::new_v4(),
            name: "Iron Lotus".to_string(),
            address,
            city,
            state,
            zip_code,
            country,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_compose_full_address() {
        let studio = address([
            Some("123 Main St"),
            Some("Austin"),
            Some("TX"),
            Some("78701"),
            Some("USA"),
        ]);
        assert_eq!(
            studio.compose().as_deref(),
            Some("123 Main St, Austin, TX 78701, USA")
        );
    }

    #[test]
    fn test_compose_skips_blank_parts() {
        let studio = address([Some("  "), Some("Berlin"), None, Some("10115"), Some("Germany")]);
        assert_eq!(studio.compose().as_deref(), Some("Berlin, 10115, Germany"));
    }

    #[test]
    fn test_compose_empty() {
        let studio = address([None, Some(" "), None, None, Some("")]);
        assert_eq!(studio.compose(), None);
    }
}
