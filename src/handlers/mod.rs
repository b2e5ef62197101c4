// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components and shared extractor settings

pub mod admin;
pub mod artists;
pub mod auth;
pub mod favorites;
pub mod flash;
pub mod geocoding;
pub mod health;
pub mod messages;
pub mod reviews;
pub mod studios;

pub use admin::config as admin_config;
pub use artists::config as artists_config;
pub use auth::config as auth_config;
pub use favorites::config as favorites_config;
pub use flash::config as flash_config;
pub use health::config as health_config;
pub use messages::config as messages_config;
pub use reviews::config as reviews_config;
pub use studios::config as studios_config;

use crate::errors::ApiError;
use actix_web::web;

/// Malformed bodies, query strings and path segments answer with the JSON error envelope
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("Invalid JSON body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("Invalid query string: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("Invalid path parameter: {}", err)).into()
    }));
}

#[cfg(test)]
pub(crate) mod testing {
    //! Application state for route tests; the pool never connects

    use crate::auth::JwtKeys;
    use crate::config::Config;
    use crate::models::Role;
    use crate::services::GeocodingJob;
    use actix_web::web;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    pub fn keys() -> JwtKeys {
        JwtKeys::from_config(&Config::for_tests())
    }

    pub fn state(cfg: &mut web::ServiceConfig) {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");

        cfg.app_data(web::Data::new(pool))
            .app_data(web::Data::new(keys()))
            .app_data(web::Data::new(GeocodingJob::new()))
            .app_data(web::Data::new(config));
        super::extractor_config(cfg);
    }

    pub fn bearer(role: Role) -> (&'static str, String) {
        let token = keys().issue(Uuid::new_v4(), role).expect("token");
        ("Authorization", format!("Bearer {}", token))
    }
}
