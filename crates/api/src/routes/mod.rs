pub mod claims;
pub mod health;
pub mod presence;
pub mod territories;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /claims/path                       start, snapshot, abandon
/// /claims/path/samples               append sample
/// /claims/path/close                 close loop
/// /claims/path/commit                commit closed path
///
/// /territories                       commit explicit outline
/// /territories/visible               viewport query
/// /territories/overlap-check         conflict preview
/// /territories/mine                  caller's territories
/// /territories/{id}/activity         refresh activity (owner only)
///
/// /users/{id}/territories            a player's territories
///
/// /presence/heartbeat                report position
/// /presence/offline                  leave density counts
/// /presence/density                  spawn suggestion
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/claims", claims::router())
        .nest("/territories", territories::router())
        .nest("/users", territories::user_router())
        .nest("/presence", presence::router())
}
