use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// User-correctable failures of a claim attempt.
///
/// None of these are fatal to the session: the caller reports them back and
/// the candidate path stays in the state documented on each variant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClaimError {
    /// Close requested with fewer than three accepted points. Path stays `Recording`.
    #[error("Path needs at least {required} points to close, has {actual}")]
    IncompletePath { required: usize, actual: usize },

    /// Start and end of the path are too far apart. Path stays `Recording`.
    #[error("Path end is {gap_meters:.1} m from its start; must be under {max_meters} m")]
    ClosureTooFar { gap_meters: f64, max_meters: f64 },

    /// Enclosed area outside the claimable range. Path stays `Recording`.
    #[error("Enclosed area {area_sq_meters:.0} m² is outside [{min_sq_meters}, {max_sq_meters}] m²")]
    AreaOutOfBounds {
        area_sq_meters: f64,
        min_sq_meters: f64,
        max_sq_meters: f64,
    },

    /// The ring crosses itself and cannot be a territory outline.
    #[error("Claim outline crosses itself")]
    SelfIntersecting,

    /// Coordinates are malformed (non-finite, out of WGS-84 range, degenerate).
    #[error("Invalid claim geometry: {0}")]
    InvalidGeometry(String),

    /// The requested action is not allowed from the path's current state.
    #[error("Cannot {action} a path in state {state}")]
    InvalidState {
        state: &'static str,
        action: &'static str,
    },

    /// The caller has no candidate path in progress.
    #[error("No claim path in progress")]
    NoActivePath,

    /// The path already holds the most points a claim may have. Path stays `Recording`.
    #[error("Path reached the limit of {max_points} points; close it or start over")]
    PathTooLong { max_points: usize },

    /// The candidate intersects this many existing territories.
    #[error("Claim overlaps existing territories ({conflicts} conflicting)")]
    OverlapConflict { conflicts: usize },
}

impl ClaimError {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ClaimError::IncompletePath { .. } => "INCOMPLETE_PATH",
            ClaimError::ClosureTooFar { .. } => "CLOSURE_TOO_FAR",
            ClaimError::AreaOutOfBounds { .. } => "AREA_OUT_OF_BOUNDS",
            ClaimError::SelfIntersecting => "SELF_INTERSECTING",
            ClaimError::InvalidGeometry(_) => "INVALID_GEOMETRY",
            ClaimError::InvalidState { .. } => "INVALID_STATE",
            ClaimError::NoActivePath => "NO_ACTIVE_PATH",
            ClaimError::PathTooLong { .. } => "PATH_TOO_LONG",
            ClaimError::OverlapConflict { .. } => "OVERLAP_CONFLICT",
        }
    }
}
