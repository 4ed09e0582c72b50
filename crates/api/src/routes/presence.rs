//! Route definitions for player presence.
//!
//! ```text
//! PRESENCE (mounted at /presence):
//! POST   /heartbeat    heartbeat
//! POST   /offline      mark_offline
//! GET    /density      density (?lat, lon, radius_meters)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::presence;
use crate::state::AppState;

/// Presence routes -- mounted at `/presence`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/heartbeat", post(presence::heartbeat))
        .route("/offline", post(presence::mark_offline))
        .route("/density", get(presence::density))
}
