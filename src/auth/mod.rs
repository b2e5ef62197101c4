// src/auth/mod.rs
// DOCUMENTATION: Authentication building blocks
// PURPOSE: Token signing, password hashing and request extractors

pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::{AdminUser, AuthUser};
pub use jwt::JwtKeys;
