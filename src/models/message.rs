// src/models/message.rs
// DOCUMENTATION: Time-limited announcements posted by artists
// PURPOSE: Rows and DTOs for /api/messages

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Longest an announcement may stay visible (30 days)
pub const MAX_MESSAGE_HOURS: i64 = 720;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArtistMessage {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub title: String,
    pub content: String,
    pub priority: String,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ArtistMessage {
    /// Visible to the public only while active and unexpired
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at > now
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessagePriority {
    Low,
    #[default]
    Normal,
    High,
}

impl MessagePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessagePriority::Low => "LOW",
            MessagePriority::Normal => "NORMAL",
            MessagePriority::High => "HIGH",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "is required"))]
    pub content: String,
    #[serde(default)]
    pub priority: MessagePriority,
    /// How long the announcement stays visible, in hours
    #[validate(range(min = 1, max = 720, message = "must be between 1 and 720 hours"))]
    pub duration_hours: i64,
}

impl CreateMessageRequest {
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::hours(self.duration_hours.clamp(1, MAX_MESSAGE_HOURS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_and_visibility() {
        let now = Utc::now();
        let req = CreateMessageRequest {
            title: "Walk-ins Friday".to_string(),
            content: "Flash day from noon".to_string(),
            priority: MessagePriority::High,
            duration_hours: 48,
        };
        let expires_at = req.expires_at(now);
        assert_eq!(expires_at - now, Duration::hours(48));

        let message = ArtistMessage {
            id: Uuid::new_v4(),
            artist_id: Uuid::new_v4(),
            title: req.title.clone(),
            content: req.content.clone(),
            priority: req.priority.as_str().to_string(),
            expires_at,
            is_active: true,
            created_at: now,
        };
        assert!(message.is_visible_at(now));
        assert!(!message.is_visible_at(now + Duration::hours(49)));
    }

    #[test]
    fn test_duration_bounds() {
        let req = CreateMessageRequest {
            title: "t".to_string(),
            content: "c".to_string(),
            priority: MessagePriority::default(),
            duration_hours: 721,
        };
        assert!(req.validate().is_err());
    }
}
