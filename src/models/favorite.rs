// src/models/favorite.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Artist bookmarked by a client
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FavoriteArtist {
    pub artist_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub profile_image: Option<String>,
    pub is_verified: bool,
    pub favorited_at: DateTime<Utc>,
}

/// Result of add/remove; `changed` is false when the call was a no-op
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FavoriteStatus {
    pub artist_id: Uuid,
    pub is_favorite: bool,
    pub changed: bool,
}
