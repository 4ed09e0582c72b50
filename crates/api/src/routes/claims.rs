//! Route definitions for walking a claim.
//!
//! ```text
//! CLAIM PATH (mounted at /claims):
//! POST   /path             start_path
//! GET    /path             get_path
//! DELETE /path             abandon_path
//! POST   /path/samples     append_sample
//! POST   /path/close       close_path
//! POST   /path/commit      commit_path
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::claims;
use crate::state::AppState;

/// Claim path routes -- mounted at `/claims`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/path",
            post(claims::start_path)
                .get(claims::get_path)
                .delete(claims::abandon_path),
        )
        .route("/path/samples", post(claims::append_sample))
        .route("/path/close", post(claims::close_path))
        .route("/path/commit", post(claims::commit_path))
}
