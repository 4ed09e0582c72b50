//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated player from a JWT Bearer token.

pub mod auth;
