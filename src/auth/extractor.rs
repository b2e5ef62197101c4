// src/auth/extractor.rs
// DOCUMENTATION: Bearer-token extractors for actix handlers
// PURPOSE: Authenticate requests and enforce roles before handlers run

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::JwtKeys;
use crate::errors::ApiError;
use crate::models::Role;

/// Caller identity taken from `Authorization: Bearer <token>`
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject with 403 unless the caller holds one of `roles`
    pub fn require_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            log::warn!(
                "User {} with role {} denied; requires one of {:?}",
                self.user_id,
                self.role,
                roles
            );
            Err(ApiError::Forbidden(format!(
                "requires role {}",
                roles
                    .iter()
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(" or ")
            )))
        }
    }

    /// Owners and admins pass
    pub fn require_owner_or_admin(&self, owner_id: Option<Uuid>) -> Result<(), ApiError> {
        if self.is_admin() || owner_id == Some(self.user_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("not the owner of this resource".to_string()))
        }
    }

    fn from_http(req: &HttpRequest) -> Result<Self, ApiError> {
        let keys = req.app_data::<web::Data<JwtKeys>>().ok_or_else(|| {
            ApiError::InternalError("JwtKeys missing from application data".to_string())
        })?;

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Expected Authorization: Bearer <token>".to_string())
        })?;

        let claims = keys.verify(token).map_err(|e| {
            log::debug!("Rejected bearer token: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(AuthUser::from_http(req))
    }
}

/// Authenticated caller holding the ADMIN role
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(AuthUser::from_http(req).and_then(|user| {
            user.require_role(&[Role::Admin])?;
            Ok(AdminUser(user))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use chrono::Duration;

    fn keys() -> JwtKeys {
        JwtKeys::new("extractor-test-secret", Duration::hours(1))
    }

    async fn whoami(user: AuthUser) -> HttpResponse {
        HttpResponse::Ok().body(user.role.as_str())
    }

    async fn admin_only(AdminUser(user): AdminUser) -> HttpResponse {
        HttpResponse::Ok().body(user.user_id.to_string())
    }

    #[actix_web::test]
    async fn test_missing_and_malformed_header() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(keys()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Token abc"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Bearer garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_admin_extractor_enforces_role() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(keys()))
                .route("/me", web::get().to(whoami))
                .route("/admin", web::get().to(admin_only)),
        )
        .await;

        let client_token = keys().issue(Uuid::new_v4(), Role::Client).unwrap();
        let admin_token = keys().issue(Uuid::new_v4(), Role::Admin).unwrap();

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", client_token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"CLIENT"));

        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", client_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", admin_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_owner_or_admin() {
        let owner = Uuid::new_v4();
        let artist = AuthUser {
            user_id: owner,
            role: Role::Artist,
        };
        assert!(artist.require_owner_or_admin(Some(owner)).is_ok());
        assert!(artist.require_owner_or_admin(Some(Uuid::new_v4())).is_err());
        assert!(artist.require_owner_or_admin(None).is_err());

        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(admin.require_owner_or_admin(None).is_ok());
        assert!(admin.require_role(&[Role::Artist, Role::Admin]).is_ok());
        assert!(artist.require_role(&[Role::Client]).is_err());
    }
}
