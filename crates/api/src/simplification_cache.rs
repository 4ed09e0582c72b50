//! Memoised simplified outlines for the visible-territories query.
//!
//! Committed geometry never changes, so an entry for `(territory, bucket)` is
//! valid forever. The map is cleared wholesale once it outgrows its capacity.

use std::collections::HashMap;
use std::sync::Arc;

use terraclaim_core::geodesy::Coordinate;
use terraclaim_core::simplify::{simplify_for_bucket, DetailBucket};
use terraclaim_core::types::DbId;
use tokio::sync::RwLock;

/// Default maximum number of cached outlines.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

pub struct SimplificationCache {
    entries: RwLock<HashMap<(DbId, DetailBucket), Arc<Vec<Coordinate>>>>,
    capacity: usize,
}

impl Default for SimplificationCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl SimplificationCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Simplified outline of territory `id` for `bucket`, computing it from
    /// `ring` on a miss. `Full` is never cached.
    pub async fn get_or_simplify(
        &self,
        id: DbId,
        bucket: DetailBucket,
        ring: &[Coordinate],
    ) -> Arc<Vec<Coordinate>> {
        if bucket == DetailBucket::Full {
            return Arc::new(ring.to_vec());
        }

        if let Some(hit) = self.entries.read().await.get(&(id, bucket)) {
            return Arc::clone(hit);
        }

        let simplified = Arc::new(simplify_for_bucket(ring, bucket));

        let mut entries = self.entries.write().await;
        if entries.len() >= self.capacity {
            tracing::debug!(evicted = entries.len(), "Simplification cache full, clearing");
            entries.clear();
        }
        entries.insert((id, bucket), Arc::clone(&simplified));
        simplified
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
