// src/handlers/auth.rs
// DOCUMENTATION: Account endpoints under /api/auth

use crate::auth::{AuthUser, JwtKeys};
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest};
use crate::services::AuthService;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// POST /api/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    let auth = AuthService::register(pool.get_ref(), keys.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(auth))
}

/// POST /api/auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    let auth = AuthService::login(pool.get_ref(), keys.get_ref(), &body).await?;
    Ok(HttpResponse::Ok().json(auth))
}

/// GET /api/auth/me
pub async fn me(pool: web::Data<PgPool>, user: AuthUser) -> Result<impl Responder, ApiError> {
    let me = AuthService::me(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(me))
}

/// POST /api/auth/forgot-password
/// DOCUMENTATION: Always 200. Outside production the token is echoed back,
/// since no mail is sent.
pub async fn forgot_password(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    let token =
        AuthService::forgot_password(pool.get_ref(), &body.email, config.reset_token_ttl_minutes)
            .await?;

    let mut response = json!({
        "message": "If an account exists for this email, a reset link has been issued"
    });
    if let Some(token) = token.filter(|_| !config.is_production()) {
        response["reset_token"] = json!(token);
    }
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    pool: web::Data<PgPool>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<impl Responder, ApiError> {
    body.validate()?;
    AuthService::reset_password(pool.get_ref(), &body).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password has been reset" })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password", web::post().to(reset_password)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_register_validation_details() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": "not-an-email", "password": "short", "name": "Ada" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let fields: Vec<&str> = body["error"]["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[actix_web::test]
    async fn test_admin_role_rejected_at_signup() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": "root@example.com",
                "password": "long-enough-password",
                "name": "Root",
                "role": "ADMIN"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_me_requires_token() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[actix_web::test]
    async fn test_malformed_json_uses_error_envelope() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}
