// src/services/auth_service.rs
// DOCUMENTATION: Account registration, login and password reset
// PURPOSE: Glue between auth handlers, the users table and token helpers

use crate::auth::jwt::{generate_reset_token, hash_reset_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::JwtKeys;
use crate::db::{ArtistRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{
    AuthResponse, LoginRequest, RegisterRequest, ResetPasswordRequest, Role, User, UserResponse,
};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Same message for every login failure so accounts cannot be probed
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Roles a visitor may pick at sign-up
pub fn self_service_role(requested: Option<Role>) -> Result<Role, ApiError> {
    match requested.unwrap_or(Role::Client) {
        Role::Admin => Err(ApiError::invalid_field(
            "role",
            "must be ARTIST or CLIENT",
        )),
        role => Ok(role),
    }
}

pub struct AuthService;

impl AuthService {
    fn token_for(keys: &JwtKeys, user: &User) -> Result<AuthResponse, ApiError> {
        let token = keys.issue(user.id, user.role).map_err(|e| {
            ApiError::InternalError(format!("Failed to sign access token: {}", e))
        })?;
        Ok(AuthResponse {
            token,
            user: user.to_response(),
        })
    }

    /// Register a new ARTIST or CLIENT
    /// DOCUMENTATION: Artist accounts get an empty profile in the same transaction
    pub async fn register(
        pool: &PgPool,
        keys: &JwtKeys,
        req: &RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        let role = self_service_role(req.role)?;
        let email = normalize_email(&req.email);
        let password_hash = hash_password(&req.password)
            .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;

        let mut tx = pool.begin().await?;
        let user = UserRepository::create(&mut tx, &email, &password_hash, req.name.trim(), role).await?;
        if role == Role::Artist {
            ArtistRepository::create_empty(&mut tx, user.id).await?;
        }
        tx.commit().await?;

        log::info!("Registered {} account {} ({})", role, user.id, email);
        Self::token_for(keys, &user)
    }

    pub async fn login(
        pool: &PgPool,
        keys: &JwtKeys,
        req: &LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        let email = normalize_email(&req.email);
        let unauthorized = || ApiError::Unauthorized(INVALID_CREDENTIALS.to_string());

        let user = UserRepository::find_by_email(pool, &email)
            .await?
            .ok_or_else(unauthorized)?;

        let matches = verify_password(&req.password, &user.password_hash)
            .map_err(|e| ApiError::InternalError(format!("Stored hash unreadable: {}", e)))?;

        if !matches || !user.is_active {
            log::warn!("Failed login for {}", email);
            return Err(unauthorized());
        }

        log::info!("User {} logged in", user.id);
        Self::token_for(keys, &user)
    }

    pub async fn me(pool: &PgPool, user_id: Uuid) -> Result<UserResponse, ApiError> {
        Ok(UserRepository::get_by_id(pool, user_id).await?.to_response())
    }

    /// Issue a reset token when the account exists
    /// DOCUMENTATION: Returns the plaintext token, or None for unknown emails.
    /// Callers must answer identically in both cases.
    pub async fn forgot_password(
        pool: &PgPool,
        email: &str,
        ttl_minutes: i64,
    ) -> Result<Option<String>, ApiError> {
        let email = normalize_email(email);
        let Some(user) = UserRepository::find_by_email(pool, &email).await? else {
            log::info!("Password reset requested for unknown email");
            return Ok(None);
        };

        let (token, token_hash) = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(ttl_minutes);
        UserRepository::set_reset_token(pool, user.id, &token_hash, expires_at).await?;

        log::info!("Password reset token issued for user {}", user.id);
        log::debug!("Reset token for {}: {}", email, token);
        Ok(Some(token))
    }

    pub async fn reset_password(pool: &PgPool, req: &ResetPasswordRequest) -> Result<(), ApiError> {
        let invalid = || ApiError::BadRequest("Reset token is invalid or has expired".to_string());
        let token_hash = hash_reset_token(req.token.trim());

        let user = UserRepository::find_by_reset_token(pool, &token_hash)
            .await?
            .ok_or_else(invalid)?;

        if !user.reset_token_is_valid(&token_hash, Utc::now()) {
            log::warn!("Expired reset token used for user {}", user.id);
            return Err(invalid());
        }

        let password_hash = hash_password(&req.password)
            .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;
        UserRepository::update_password(pool, user.id, &password_hash).await?;

        log::info!("Password reset completed for user {}", user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Ink@Example.COM "), "ink@example.com");
    }

    #[test]
    fn test_admin_cannot_self_register() {
        assert_eq!(self_service_role(None).unwrap(), Role::Client);
        assert_eq!(self_service_role(Some(Role::Artist)).unwrap(), Role::Artist);
        assert!(matches!(
            self_service_role(Some(Role::Admin)),
            Err(ApiError::ValidationError(_))
        ));
    }

    fn keys() -> JwtKeys {
        JwtKeys::new("auth-service-test-secret", Duration::hours(1))
    }

    fn signup(email: &str, role: Option<Role>) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "correct horse battery".to_string(),
            name: "Sam Ink".to_string(),
            role,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_register_then_login(pool: PgPool) {
        let keys = keys();
        let registered = AuthService::register(&pool, &keys, &signup("Sam@Ink.io", Some(Role::Artist)))
            .await
            .unwrap();
        assert_eq!(registered.user.email, "sam@ink.io");
        assert!(ArtistRepository::get_by_user_id(&pool, registered.user.id).await.is_ok());

        let login = LoginRequest {
            email: "sam@ink.io".to_string(),
            password: "correct horse battery".to_string(),
        };
        let session = AuthService::login(&pool, &keys, &login).await.unwrap();
        assert_eq!(keys.verify(&session.token).unwrap().sub, registered.user.id);

        let duplicate = AuthService::register(&pool, &keys, &signup("sam@ink.io", None)).await;
        assert!(matches!(duplicate, Err(ApiError::Conflict(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_login_failures_look_identical(pool: PgPool) {
        let keys = keys();
        AuthService::register(&pool, &keys, &signup("client@ink.io", None))
            .await
            .unwrap();

        let wrong_password = LoginRequest {
            email: "client@ink.io".to_string(),
            password: "not the password".to_string(),
        };
        let unknown_email = LoginRequest {
            email: "ghost@ink.io".to_string(),
            password: "whatever123".to_string(),
        };

        let a = AuthService::login(&pool, &keys, &wrong_password).await.unwrap_err();
        let b = AuthService::login(&pool, &keys, &unknown_email).await.unwrap_err();
        assert!(matches!(a, ApiError::Unauthorized(_)));
        assert_eq!(a.to_string(), b.to_string());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_reset_token_single_use_and_expiry(pool: PgPool) {
        let keys = keys();
        let user = AuthService::register(&pool, &keys, &signup("reset@ink.io", None))
            .await
            .unwrap()
            .user;

        assert_eq!(
            AuthService::forgot_password(&pool, "nobody@ink.io", 60).await.unwrap(),
            None
        );

        let token = AuthService::forgot_password(&pool, "reset@ink.io", 60)
            .await
            .unwrap()
            .unwrap();
        let reset = ResetPasswordRequest {
            token: token.clone(),
            password: "brand new password".to_string(),
        };
        AuthService::reset_password(&pool, &reset).await.unwrap();
        assert!(matches!(
            AuthService::reset_password(&pool, &reset).await,
            Err(ApiError::BadRequest(_))
        ));

        let (expired, expired_hash) = generate_reset_token();
        UserRepository::set_reset_token(&pool, user.id, &expired_hash, Utc::now() - Duration::minutes(1))
            .await
            .unwrap();
        let late = ResetPasswordRequest {
            token: expired,
            password: "another password".to_string(),
        };
        assert!(matches!(
            AuthService::reset_password(&pool, &late).await,
            Err(ApiError::BadRequest(_))
        ));
    }
}
