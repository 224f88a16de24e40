use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stride_core::error::CoreError;

/// Expected, user-visible policy rejections. These are control flow, not
/// faults: they map to 4xx responses with stable codes and are never logged
/// at error level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRejection {
    /// A check-in for this goal and civil day is already recorded.
    AlreadyCheckedIn,
    /// The request's day is earlier than the goal's recorded last check-in.
    ClockSkew,
    /// The owner's nudge quota for today is exhausted.
    NudgeLimitReached,
    /// The owner already holds the tier's maximum of active goals.
    GoalLimitReached,
}

impl PolicyRejection {
    fn status(self) -> StatusCode {
        match self {
            PolicyRejection::AlreadyCheckedIn => StatusCode::CONFLICT,
            PolicyRejection::ClockSkew => StatusCode::CONFLICT,
            PolicyRejection::NudgeLimitReached => StatusCode::TOO_MANY_REQUESTS,
            PolicyRejection::GoalLimitReached => StatusCode::CONFLICT,
        }
    }

    fn code(self) -> &'static str {
        match self {
            PolicyRejection::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            PolicyRejection::ClockSkew => "CLOCK_SKEW",
            PolicyRejection::NudgeLimitReached => "NUDGE_LIMIT_REACHED",
            PolicyRejection::GoalLimitReached => "GOAL_LIMIT_REACHED",
        }
    }

    fn message(self) -> &'static str {
        match self {
            PolicyRejection::AlreadyCheckedIn => "Already checked in for today",
            PolicyRejection::ClockSkew => "Check-in day precedes the recorded last check-in",
            PolicyRejection::NudgeLimitReached => "Daily nudge limit reached for this plan",
            PolicyRejection::GoalLimitReached => "Active goal limit reached for this plan",
        }
    }
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `stride-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An expected policy rejection (quota, idempotence, skew).
    #[error("Policy rejection")]
    Policy(PolicyRejection),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Policy(rejection) => {
                (rejection.status(), rejection.code(), rejection.message().to_string())
            }

            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Configuration(msg) => {
                    tracing::error!(error = %msg, "Configuration error surfaced on request path");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
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
