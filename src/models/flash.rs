// src/models/flash.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::PageParams;

/// Ready-to-tattoo design offered by an artist at a fixed price
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Flash {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub price: Option<f64>,
    pub size: Option<String>,
    pub tags: Vec<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flash DTO for API responses
#[derive(Debug, Clone, Serialize)]
pub struct FlashResponse {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub price: Option<f64>,
    pub size: Option<String>,
    pub tags: Vec<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl Flash {
    pub fn to_response(&self) -> FlashResponse {
        FlashResponse {
            id: self.id,
            artist_id: self.artist_id,
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            size: self.size.clone(),
            tags: self.tags.clone(),
            is_available: self.is_available,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFlashRequest {
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub price: Option<f64>,
    #[validate(length(max = 50))]
    pub size: Option<String>,
    #[validate(length(max = 15, message = "at most 15 tags"))]
    #[serde(default)]
    pub tags: Vec<String>,
}

/// PUT /api/flash/{id}
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFlashRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub price: Option<f64>,
    #[validate(length(max = 50))]
    pub size: Option<String>,
    #[validate(length(max = 15, message = "at most 15 tags"))]
    pub tags: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

/// Query string for GET /api/flash
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub artist_id: Option<Uuid>,
    pub tag: Option<String>,
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl FlashQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Lower-case, trim and de-duplicate tags, dropping empty ones
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
