// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod admin_repository;
pub mod artist_repository;
pub mod favorite_repository;
pub mod flash_repository;
pub mod geocode_repository;
pub mod message_repository;
pub mod review_repository;
pub mod studio_repository;
pub mod user_repository;

pub use admin_repository::*;
pub use artist_repository::*;
pub use favorite_repository::*;
pub use flash_repository::*;
pub use geocode_repository::*;
pub use message_repository::*;
pub use review_repository::*;
pub use studio_repository::*;
pub use user_repository::*;
