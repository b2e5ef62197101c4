// src/models/user.rs
// DOCUMENTATION: Accounts, roles and auth DTOs
// PURPOSE: Serialization models for users and the /api/auth endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Account role
/// DOCUMENTATION: Stored as upper-case TEXT in users.role and carried in JWT claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Artist,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Artist => "ARTIST",
            Role::Client => "CLIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "ARTIST" => Ok(Role::Artist),
            "CLIENT" => Ok(Role::Client),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Raw users row; converted to [`User`] once the role string is parsed
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            role: row.role.parse()?,
            is_active: row.is_active,
            reset_token_hash: row.reset_token_hash,
            reset_token_expires_at: row.reset_token_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl User {
    /// A reset token is usable only while its expiry lies in the future
    pub fn reset_token_is_valid(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(stored), Some(expires_at)) => stored == token_hash && expires_at > now,
            _ => false,
        }
    }

    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Public view of an account (never includes hashes)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "is required"))]
    pub name: String,

    /// ARTIST or CLIENT; defaults to CLIENT
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub token: String,

    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user_with_token(hash: Option<&str>, expires_at: Option<DateTime<Utc>>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ink@example.com".to_string(),
            password_hash: String::new(),
            name: "Ink".to_string(),
            role: Role::Client,
            is_active: true,
            reset_token_hash: hash.map(str::to_string),
            reset_token_expires_at: expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("artist".parse::<Role>().unwrap(), Role::Artist);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"CLIENT\"");
    }

    #[test]
    fn test_reset_token_expiry() {
        let now = Utc::now();

        let user = user_with_token(Some("abc"), Some(now + Duration::minutes(30)));
        assert!(user.reset_token_is_valid("abc", now));
        assert!(!user.reset_token_is_valid("abd", now));
        assert!(!user.reset_token_is_valid("abc", now + Duration::minutes(31)));

        let expired = user_with_token(Some("abc"), Some(now - Duration::seconds(1)));
        assert!(!expired.reset_token_is_valid("abc", now));

        let cleared = user_with_token(None, None);
        assert!(!cleared.reset_token_is_valid("abc", now));
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: String::new(),
            role: None,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
    }
}
