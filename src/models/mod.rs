// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod admin;
pub mod artist;
pub mod favorite;
pub mod flash;
pub mod geocode;
pub mod message;
pub mod pagination;
pub mod review;
pub mod studio;
pub mod user;

pub use admin::*;
pub use artist::*;
pub use favorite::*;
pub use flash::*;
pub use geocode::*;
pub use message::*;
pub use pagination::*;
pub use review::*;
pub use studio::*;
pub use user::*;
