// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod admin_service;
pub mod artist_service;
pub mod auth_service;
pub mod cache;
pub mod favorite_service;
pub mod flash_service;
pub mod geocoding_client;
pub mod geocoding_job;
pub mod geocoding_service;
pub mod message_service;
pub mod review_service;
pub mod studio_service;

pub use admin_service::*;
pub use artist_service::*;
pub use auth_service::*;
pub use cache::*;
pub use favorite_service::*;
pub use flash_service::*;
pub use geocoding_client::*;
pub use geocoding_job::*;
pub use geocoding_service::*;
pub use message_service::*;
pub use review_service::*;
pub use studio_service::*;
