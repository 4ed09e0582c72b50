//! HTTP surface of the land-claim server.
//!
//! Players record a walked path through [`sessions`], close it into a ring and
//! commit it as a territory; map clients read territories back simplified to
//! their zoom level through [`simplification_cache`]. Presence heartbeats feed
//! the spawn-density suggestion.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod sessions;
pub mod simplification_cache;
pub mod state;
