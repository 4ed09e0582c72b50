//! Candidate-path recording: the state machine for one claim attempt.
//!
//! ```text
//! Empty -> Recording -> Closed -> Committed
//!                 ^        |  \-> Rejected
//!                 |        |
//!   (close fails) +        +-----> Abandoned (from any non-terminal state)
//! ```
//!
//! A path is owned by exactly one session and never shared, so nothing here
//! is synchronised.

use serde::{Deserialize, Serialize};

use crate::closure::{check_closure, close_ring};
use crate::error::ClaimError;
use crate::geodesy::Coordinate;
use crate::polygon::{ClaimPolygon, MAX_CLAIM_VERTICES};
use crate::types::DbId;
use crate::validator::{
    validate_sample, LocationSample, RejectReason, SampleVerdict, TrackPoint, ValidatorConfig,
};

/// Accepted points a path may hold; one more than a claim outline may have
/// leaves room for a final point on top of the start.
pub const MAX_PATH_POINTS: usize = MAX_CLAIM_VERTICES + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathState {
    Empty,
    Recording,
    Closed,
    Committed,
    Rejected,
    Abandoned,
}

impl PathState {
    pub fn as_str(self) -> &'static str {
        match self {
            PathState::Empty => "empty",
            PathState::Recording => "recording",
            PathState::Closed => "closed",
            PathState::Committed => "committed",
            PathState::Rejected => "rejected",
            PathState::Abandoned => "abandoned",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PathState::Committed | PathState::Rejected | PathState::Abandoned
        )
    }
}

/// Result of feeding one sample to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum AppendOutcome {
    /// The sample was appended.
    Accepted,
    /// The sample was dropped; the path continues from its previous point.
    Rejected(RejectReason),
    /// Continuity was lost; earlier points were discarded and the sample
    /// starts a fresh path.
    Restarted(RejectReason),
}

/// The completed loop of a closed path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedRing {
    /// First point repeated at the end.
    pub ring: Vec<Coordinate>,
    pub area_sq_meters: f64,
}

#[derive(Debug, Clone)]
pub struct CandidatePath {
    owner: DbId,
    points: Vec<TrackPoint>,
    state: PathState,
    closed: Option<ClosedRing>,
    restarts: u32,
    config: ValidatorConfig,
}

impl CandidatePath {
    pub fn new(owner: DbId) -> Self {
        Self::with_config(owner, ValidatorConfig::default())
    }

    pub fn with_config(owner: DbId, config: ValidatorConfig) -> Self {
        Self {
            owner,
            points: Vec::new(),
            state: PathState::Empty,
            closed: None,
            restarts: 0,
            config,
        }
    }

    pub fn owner(&self) -> DbId {
        self.owner
    }

    pub fn state(&self) -> PathState {
        self.state
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// How many times continuity loss restarted this path.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn closed_ring(&self) -> Option<&ClosedRing> {
        self.closed.as_ref()
    }

    /// Validate and append a sample.
    ///
    /// Allowed in `Empty` and `Recording`. Speed and teleport rejections drop
    /// the sample; a stale sample restarts the path from itself. A valid
    /// sample beyond [`MAX_PATH_POINTS`] fails with `PathTooLong`.
    pub fn append(&mut self, sample: &LocationSample) -> Result<AppendOutcome, ClaimError> {
        if !matches!(self.state, PathState::Empty | PathState::Recording) {
            return Err(self.invalid("append to"));
        }

        match validate_sample(self.points.last(), sample, &self.config) {
            SampleVerdict::Accept if self.points.len() >= MAX_PATH_POINTS => {
                Err(ClaimError::PathTooLong {
                    max_points: MAX_PATH_POINTS,
                })
            }
            SampleVerdict::Accept => {
                self.points.push(TrackPoint::from(sample));
                self.state = PathState::Recording;
                Ok(AppendOutcome::Accepted)
            }
            SampleVerdict::Reject(RejectReason::Stale) => {
                self.points.clear();
                self.points.push(TrackPoint::from(sample));
                self.restarts += 1;
                self.state = PathState::Recording;
                Ok(AppendOutcome::Restarted(RejectReason::Stale))
            }
            SampleVerdict::Reject(reason) => Ok(AppendOutcome::Rejected(reason)),
        }
    }

    /// Attempt to close the loop.
    ///
    /// Only allowed in `Recording`. The ring gets the same checks as any
    /// committed outline, so a loop that crosses itself fails here. On
    /// failure the path stays `Recording` so the user can keep walking and
    /// try again.
    pub fn close(&mut self) -> Result<&ClosedRing, ClaimError> {
        if self.state != PathState::Recording {
            return Err(self.invalid("close"));
        }

        check_closure(&self.points)?;
        let polygon = ClaimPolygon::from_ring(&close_ring(&self.points))?;

        self.state = PathState::Closed;
        Ok(self.closed.insert(ClosedRing {
            ring: polygon.ring().to_vec(),
            area_sq_meters: polygon.area_sq_meters(),
        }))
    }

    /// Record a successful commit. Only allowed in `Closed`.
    pub fn mark_committed(&mut self) -> Result<(), ClaimError> {
        self.transition_from_closed(PathState::Committed, "commit")
    }

    /// Record a commit that failed validation. Only allowed in `Closed`.
    pub fn mark_rejected(&mut self) -> Result<(), ClaimError> {
        self.transition_from_closed(PathState::Rejected, "reject")
    }

    /// Cancel the attempt. Allowed from any non-terminal state; has no
    /// side effects outside this value.
    pub fn abandon(&mut self) -> Result<(), ClaimError> {
        if self.state.is_terminal() {
            return Err(self.invalid("abandon"));
        }
        self.state = PathState::Abandoned;
        Ok(())
    }

    fn transition_from_closed(
        &mut self,
        to: PathState,
        action: &'static str,
    ) -> Result<(), ClaimError> {
        if self.state != PathState::Closed {
            return Err(self.invalid(action));
        }
        self.state = to;
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> ClaimError {
        ClaimError::InvalidState {
            state: self.state.as_str(),
            action,
        }
    }
}
