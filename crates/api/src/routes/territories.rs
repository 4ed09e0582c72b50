//! Route definitions for committed territories.
//!
//! ```text
//! TERRITORIES (mounted at /territories):
//! POST   /                  commit_territory
//! GET    /visible           list_visible (?min_lat, min_lon, max_lat, max_lon, detail_level)
//! POST   /overlap-check     overlap_check
//! GET    /mine              list_mine
//! POST   /{id}/activity     refresh_activity
//!
//! USERS (mounted at /users):
//! GET    /{id}/territories  list_for_user
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::territories;
use crate::state::AppState;

/// Territory routes -- mounted at `/territories`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(territories::commit_territory))
        .route("/visible", get(territories::list_visible))
        .route("/overlap-check", post(territories::overlap_check))
        .route("/mine", get(territories::list_mine))
        .route("/{id}/activity", post(territories::refresh_activity))
}

/// Per-user territory listing -- mounted at `/users`.
pub fn user_router() -> Router<AppState> {
    Router::new().route("/{id}/territories", get(territories::list_for_user))
}
