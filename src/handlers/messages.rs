// src/handlers/messages.rs
// DOCUMENTATION: Artist announcements; public reads live under /api/artists/{id}/messages

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::models::{CreateMessageRequest, Role};
use crate::services::MessageService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /api/messages
pub async fn create_message(
    pool: web::Data<PgPool>,
    user: AuthUser,
    body: web::Json<CreateMessageRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Artist])?;
    body.validate()?;
    let message = MessageService::create(pool.get_ref(), user.user_id, &body).await?;
    Ok(HttpResponse::Created().json(message))
}

/// GET /api/messages/mine
pub async fn my_messages(pool: web::Data<PgPool>, user: AuthUser) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Artist])?;
    let messages = MessageService::list_mine(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// POST /api/messages/{id}/deactivate
pub async fn deactivate_message(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    user.require_role(&[Role::Artist])?;
    let message = MessageService::deactivate(pool.get_ref(), user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(message))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/messages")
            .route("", web::post().to(create_message))
            .route("/mine", web::get().to(my_messages))
            .route("/{id}/deactivate", web::post().to(deactivate_message)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_duration_limits() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        for hours in [0, 721] {
            let req = test::TestRequest::post()
                .uri("/api/messages")
                .insert_header(testing::bearer(Role::Artist))
                .set_json(json!({
                    "title": "Flash day",
                    "content": "Walk-ins welcome",
                    "duration_hours": hours
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_clients_cannot_post() {
        let app = test::init_service(App::new().configure(testing::state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/messages")
            .insert_header(testing::bearer(Role::Client))
            .set_json(json!({ "title": "t", "content": "c", "duration_hours": 24 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
