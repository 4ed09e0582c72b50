//! In-memory claim sessions: at most one [`CandidatePath`] per player.
//!
//! Paths are never persisted. A restart of the server drops every unfinished
//! claim, and the idle sweep in [`crate::background::session_sweep`] discards
//! paths nobody has touched for a while.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use terraclaim_core::error::ClaimError;
use terraclaim_core::geodesy::Coordinate;
use terraclaim_core::path::{AppendOutcome, CandidatePath, ClosedRing, PathState};
use terraclaim_core::types::DbId;
use terraclaim_core::validator::{LocationSample, ValidatorConfig};
use tokio::sync::RwLock;

struct ClaimSession {
    path: CandidatePath,
    last_outcome: Option<AppendOutcome>,
    last_touched: Instant,
}

impl ClaimSession {
    fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    fn snapshot(&self) -> PathSnapshot {
        PathSnapshot {
            state: self.path.state(),
            point_count: self.path.points().len(),
            restarts: self.path.restarts(),
            last_outcome: self.last_outcome,
            points: self.path.points().iter().map(|p| p.coordinate).collect(),
            closed: self.path.closed_ring().cloned(),
        }
    }
}

/// Client-facing view of a player's candidate path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSnapshot {
    pub state: PathState,
    pub point_count: usize,
    pub restarts: u32,
    pub last_outcome: Option<AppendOutcome>,
    pub points: Vec<Coordinate>,
    pub closed: Option<ClosedRing>,
}

/// Result of appending one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppendResult {
    pub outcome: AppendOutcome,
    pub path: PathSnapshot,
}

/// Owns every player's in-progress claim path.
pub struct ClaimSessionManager {
    sessions: RwLock<HashMap<DbId, ClaimSession>>,
    validator: ValidatorConfig,
}

impl Default for ClaimSessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSessionManager {
    pub fn new() -> Self {
        Self::with_validator(ValidatorConfig::default())
    }

    pub fn with_validator(validator: ValidatorConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            validator,
        }
    }

    /// Begin a new path, discarding any previous one.
    pub async fn start(&self, user_id: DbId) -> PathSnapshot {
        let session = ClaimSession {
            path: CandidatePath::with_config(user_id, self.validator),
            last_outcome: None,
            last_touched: Instant::now(),
        };
        let snapshot = session.snapshot();

        let replaced = self.sessions.write().await.insert(user_id, session);
        if let Some(old) = replaced {
            tracing::debug!(
                user_id,
                state = old.path.state().as_str(),
                "Replaced existing claim path"
            );
        }
        snapshot
    }

    /// Feed one sample to the player's path.
    pub async fn append(
        &self,
        user_id: DbId,
        sample: &LocationSample,
    ) -> Result<AppendResult, ClaimError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user_id).ok_or(ClaimError::NoActivePath)?;

        let outcome = session.path.append(sample)?;
        session.last_outcome = Some(outcome);
        session.touch();

        if let AppendOutcome::Restarted(reason) = outcome {
            tracing::info!(user_id, reason = reason.as_str(), "Claim path restarted");
        }
        Ok(AppendResult {
            outcome,
            path: session.snapshot(),
        })
    }

    /// Close the player's loop. On failure the path keeps recording.
    pub async fn close(&self, user_id: DbId) -> Result<ClosedRing, ClaimError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user_id).ok_or(ClaimError::NoActivePath)?;
        session.touch();
        let ring = session.path.close()?.clone();

        tracing::info!(
            user_id,
            vertices = ring.ring.len(),
            area_sq_meters = ring.area_sq_meters,
            "Claim path closed"
        );
        Ok(ring)
    }

    pub async fn snapshot(&self, user_id: DbId) -> Option<PathSnapshot> {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .map(ClaimSession::snapshot)
    }

    /// Cancel the player's path and forget it.
    pub async fn abandon(&self, user_id: DbId) -> Result<PathSnapshot, ClaimError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user_id).ok_or(ClaimError::NoActivePath)?;
        session.path.abandon()?;
        let snapshot = session.snapshot();
        sessions.remove(&user_id);
        Ok(snapshot)
    }

    /// The closed ring ready for commit. The path stays `Closed` until the
    /// commit outcome is recorded.
    pub async fn take_closed_ring(&self, user_id: DbId) -> Result<ClosedRing, ClaimError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user_id).ok_or(ClaimError::NoActivePath)?;
        session.touch();
        match (session.path.state(), session.path.closed_ring()) {
            (PathState::Closed, Some(ring)) => Ok(ring.clone()),
            (state, _) => Err(ClaimError::InvalidState {
                state: state.as_str(),
                action: "commit",
            }),
        }
    }

    pub async fn mark_committed(&self, user_id: DbId) -> Result<(), ClaimError> {
        self.with_path(user_id, CandidatePath::mark_committed).await
    }

    pub async fn mark_rejected(&self, user_id: DbId) -> Result<(), ClaimError> {
        self.with_path(user_id, CandidatePath::mark_rejected).await
    }

    /// Drop paths idle for at least `timeout`. Returns how many were dropped.
    pub async fn sweep_inactive(&self, timeout: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_touched.elapsed() < timeout);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn with_path<F>(&self, user_id: DbId, f: F) -> Result<(), ClaimError>
    where
        F: FnOnce(&mut CandidatePath) -> Result<(), ClaimError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user_id).ok_or(ClaimError::NoActivePath)?;
        session.touch();
        f(&mut session.path)
    }
}
