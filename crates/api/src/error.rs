use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use terraclaim_core::error::{ClaimError, CoreError};
use terraclaim_db::repositories::CommitError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`], [`ClaimError`] and [`CommitError`] and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `terraclaim_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A user-correctable claim failure.
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// A failed territory commit.
    #[error(transparent)]
    Commit(#[from] CommitError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request DTO failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route matched the request path.
    #[error("No route for {0}")]
    RouteNotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut conflicts: Option<usize> = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Claim errors ---
            AppError::Claim(err) => (claim_status(err), err.code(), err.to_string()),

            // --- Commit errors ---
            AppError::Commit(err) => match err {
                CommitError::Validation(claim) => {
                    (claim_status(claim), claim.code(), claim.to_string())
                }
                CommitError::InvalidName(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CommitError::OverlapConflict(found) => {
                    // Other players' territories are reported by count only.
                    tracing::debug!(
                        territory_ids = ?found.iter().map(|c| c.id).collect::<Vec<_>>(),
                        "Commit blocked by existing territories",
                    );
                    let claim = ClaimError::OverlapConflict {
                        conflicts: found.len(),
                    };
                    conflicts = Some(found.len());
                    (claim_status(&claim), claim.code(), claim.to_string())
                }
                CommitError::Storage(db) => classify_sqlx_error(db),
                CommitError::RetriesExhausted => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_FAILURE",
                    "Storage is busy, please retry".to_string(),
                ),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::RouteNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
        };

        let body = match conflicts {
            Some(conflicts) => json!({
                "error": message,
                "code": code,
                "conflicts": conflicts,
            }),
            None => json!({
                "error": message,
                "code": code,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
    }
}

/// Claim errors the player can correct map to 422; malformed geometry is a
/// plain bad request and overlaps are conflicts.
fn claim_status(err: &ClaimError) -> StatusCode {
    match err {
        ClaimError::InvalidGeometry(_) => StatusCode::BAD_REQUEST,
        ClaimError::OverlapConflict { .. } => StatusCode::CONFLICT,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Pool exhaustion and lock timeouts map to 503.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::PoolTimedOut => {
            tracing::error!(error = %err, "Database pool exhausted");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_FAILURE",
                "Storage is busy, please retry".to_string(),
            )
        }
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("55P03") => {
            tracing::warn!(error = %db_err, "Database lock timeout");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_FAILURE",
                "Storage is busy, please retry".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
