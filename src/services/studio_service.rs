// src/services/studio_service.rs
// DOCUMENTATION: Business logic for studios
// PURPOSE: Ownership checks, membership, GeoJSON map and nearby search

use crate::auth::AuthUser;
use crate::db::{ArtistRepository, StudioRepository};
use crate::errors::ApiError;
use crate::services::AdminService;
use crate::models::{
    AddStudioArtistRequest, CreateStudioRequest, NearbyQuery, NewAdminAction, NearbyStudio, Paginated, Studio,
    StudioArtist, StudioDetailResponse, StudioQuery, UpdateStudioRequest,
};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

const DEFAULT_RADIUS_KM: f64 = 25.0;
const DEFAULT_NEARBY_LIMIT: i64 = 20;

/// Point feature for a studio; `None` until it has been geocoded
pub fn studio_feature(studio: &Studio) -> Option<Feature> {
    let (lat, lng) = (studio.latitude?, studio.longitude?);
    let point = geo_types::Point::new(lng, lat);

    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(studio.name));
    properties.insert("city".to_string(), json!(studio.city));
    properties.insert("address".to_string(), json!(studio.address));
    properties.insert("is_verified".to_string(), json!(studio.is_verified));
    properties.insert("is_featured".to_string(), json!(studio.is_featured));

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&point))),
        id: Some(Id::String(studio.id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    })
}

pub fn feature_collection(studios: &[Studio]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: studios.iter().filter_map(studio_feature).collect(),
        foreign_members: None,
    }
}

pub struct StudioService;

impl StudioService {
    pub async fn search(pool: &PgPool, query: &StudioQuery) -> Result<Paginated<Studio>, ApiError> {
        let (studios, total_count) = StudioRepository::search(pool, query).await?;
        Ok(Paginated::new(studios, total_count, query.page_params()))
    }

    pub async fn get_studio(pool: &PgPool, id: Uuid) -> Result<StudioDetailResponse, ApiError> {
        let studio = StudioRepository::get_by_id(pool, id).await?;
        let artists = StudioRepository::artists(pool, id).await?;
        Ok(StudioDetailResponse { studio, artists })
    }

    pub async fn create(
        pool: &PgPool,
        caller: AuthUser,
        req: &CreateStudioRequest,
    ) -> Result<Studio, ApiError> {
        if req.latitude.is_some() != req.longitude.is_some() {
            return Err(ApiError::invalid_field(
                "latitude",
                "latitude and longitude must be given together",
            ));
        }
        StudioRepository::create(pool, caller.user_id, req).await
    }

    /// Owner or admin; address edits clear coordinates for re-geocoding
    pub async fn update(
        pool: &PgPool,
        caller: AuthUser,
        id: Uuid,
        req: &UpdateStudioRequest,
    ) -> Result<Studio, ApiError> {
        let studio = StudioRepository::get_by_id(pool, id).await?;
        caller.require_owner_or_admin(studio.owner_id)?;

        let updated = StudioRepository::update(pool, id, req).await?;
        if req.touches_address() {
            log::info!("Studio {} address changed; coordinates cleared", id);
        }
        Ok(updated)
    }

    /// Owner or admin; admin deletions land in the audit log
    pub async fn delete(pool: &PgPool, caller: AuthUser, id: Uuid) -> Result<(), ApiError> {
        let studio = StudioRepository::get_by_id(pool, id).await?;
        caller.require_owner_or_admin(studio.owner_id)?;
        StudioRepository::delete(pool, id).await?;

        if caller.is_admin() && studio.owner_id != Some(caller.user_id) {
            AdminService::record(
                pool,
                NewAdminAction {
                    admin_id: caller.user_id,
                    action: "DELETE_STUDIO",
                    target_type: "STUDIO",
                    target_id: Some(id),
                    reason: None,
                    metadata: Some(json!({ "name": studio.name })),
                },
            )
            .await?;
        }
        Ok(())
    }

    pub async fn add_artist(
        pool: &PgPool,
        caller: AuthUser,
        studio_id: Uuid,
        req: &AddStudioArtistRequest,
    ) -> Result<Vec<StudioArtist>, ApiError> {
        let studio = StudioRepository::get_by_id(pool, studio_id).await?;
        caller.require_owner_or_admin(studio.owner_id)?;
        ArtistRepository::get_by_id(pool, req.artist_id).await?;

        let role = req.role.as_deref().unwrap_or("ARTIST");
        StudioRepository::add_artist(pool, studio_id, req.artist_id, role).await?;
        StudioRepository::artists(pool, studio_id).await
    }

    pub async fn remove_artist(
        pool: &PgPool,
        caller: AuthUser,
        studio_id: Uuid,
        artist_id: Uuid,
    ) -> Result<(), ApiError> {
        let studio = StudioRepository::get_by_id(pool, studio_id).await?;
        caller.require_owner_or_admin(studio.owner_id)?;

        if !StudioRepository::remove_artist(pool, studio_id, artist_id).await? {
            return Err(ApiError::NotFound(format!(
                "Artist {} in studio {}",
                artist_id, studio_id
            )));
        }
        Ok(())
    }

    pub async fn map(pool: &PgPool) -> Result<FeatureCollection, ApiError> {
        let studios = StudioRepository::with_coordinates(pool).await?;
        Ok(feature_collection(&studios))
    }

    pub async fn nearby(pool: &PgPool, query: &NearbyQuery) -> Result<Vec<NearbyStudio>, ApiError> {
        StudioRepository::nearby(
            pool,
            query.lat,
            query.lng,
            query.radius_km.unwrap_or(DEFAULT_RADIUS_KM),
            query.limit.unwrap_or(DEFAULT_NEARBY_LIMIT),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn studio(coordinates: Option<(f64, f64)>) -> Studio {
        Studio {
            id: Uuid::new_v4(),
            name: "Black Rose".to_string(),
            description: None,
            address: Some("1 Congress Ave".to_string()),
            city: Some("Austin".to_string()),
            state: None,
            zip_code: None,
            country: None,
            phone: None,
            email: None,
            website: None,
            instagram: None,
            latitude: coordinates.map(|c| c.0),
            longitude: coordinates.map(|c| c.1),
            is_verified: true,
            is_featured: false,
            owner_id: None,
            geocode_status: None,
            geocode_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_map_contains_only_located_studios() {
        let located = studio(Some((30.27, -97.74)));
        let collection = feature_collection(&[located.clone(), studio(None)]);

        assert_eq!(collection.features.len(), 1);
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        // GeoJSON orders positions as [longitude, latitude]
        assert_eq!(feature["geometry"]["coordinates"], json!([-97.74, 30.27]));
        assert_eq!(feature["id"], json!(located.id.to_string()));
        assert_eq!(feature["properties"]["name"], "Black Rose");
    }
}
