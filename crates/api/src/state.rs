use std::sync::Arc;

use crate::config::ServerConfig;
use crate::sessions::ClaimSessionManager;
use crate::simplification_cache::SimplificationCache;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: terraclaim_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-progress claim paths, one per player.
    pub sessions: Arc<ClaimSessionManager>,
    /// Simplified territory outlines keyed by detail bucket.
    pub simplification_cache: Arc<SimplificationCache>,
}

impl AppState {
    pub fn new(pool: terraclaim_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            sessions: Arc::new(ClaimSessionManager::new()),
            simplification_cache: Arc::new(SimplificationCache::default()),
        }
    }
}
