// src/models/admin.rs
// DOCUMENTATION: Moderation audit log and admin dashboard DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::{PageParams, Role, VerificationStatus};

/// Row of the admin_actions audit log
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminAction {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub reason: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Audit entry to be written alongside a moderation change
#[derive(Debug, Clone)]
pub struct NewAdminAction {
    pub admin_id: Uuid,
    pub action: &'static str,
    pub target_type: &'static str,
    pub target_id: Option<Uuid>,
    pub reason: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub users_by_role: Vec<RoleCount>,
    pub artists_pending_verification: i64,
    pub studios_total: i64,
    pub studios_without_coordinates: i64,
    pub studios_geocode_failed: i64,
    pub reviews_total: i64,
    pub flash_total: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyArtistRequest {
    pub status: VerificationStatus,
    pub reason: Option<String>,
}

/// Toggle for studio verification/featured flags and user activation
#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub value: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl UserQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}
