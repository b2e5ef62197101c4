// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Review left by one user about another, unique per (author, recipient)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub author_id: Uuid,
    pub recipient_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review as listed on a profile, with the author's display name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewWithAuthor {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub recipient_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated rating for a recipient
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
}

/// Reviews for one recipient plus their rating summary
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub summary: RatingSummary,
    pub reviews: Vec<ReviewWithAuthor>,
}

/// Request to create a new review
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub recipient_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut req = CreateReviewRequest {
            recipient_id: Uuid::new_v4(),
            rating: 6,
            title: None,
            comment: Some("Clean linework".to_string()),
        };
        assert!(req.validate().is_err());

        req.rating = 0;
        assert!(req.validate().is_err());

        req.rating = 5;
        assert!(req.validate().is_ok());
    }
}
