use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    engine::{ProgressionError, resolver::StatsError},
    state::match_phase::InvalidTransition,
};

/// Errors that can occur in service layer operations.
///
/// All variants are local, recoverable conditions; a rejected operation
/// performs no partial writes.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A round or stage was requested out of order.
    #[error("round {round} must be completed first")]
    PrerequisiteNotMet {
        /// The blocking round.
        round: u32,
    },
    /// The requested round or bracket already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Too few teams remain for the requested stage.
    #[error("not enough participants: need {needed}, have {got}")]
    InsufficientParticipants {
        /// Minimum required.
        needed: usize,
        /// Teams actually available.
        got: usize,
    },
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ProgressionError> for ServiceError {
    fn from(err: ProgressionError) -> Self {
        match err {
            ProgressionError::PrerequisiteNotMet { round } => {
                ServiceError::PrerequisiteNotMet { round }
            }
            ProgressionError::AlreadyExists { what } => ServiceError::AlreadyExists(what),
            ProgressionError::InsufficientParticipants { needed, got } => {
                ServiceError::InsufficientParticipants { needed, got }
            }
        }
    }
}

impl From<StatsError> for ServiceError {
    fn from(err: StatsError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Semantically valid request that the tournament state cannot satisfy.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            err @ ServiceError::PrerequisiteNotMet { .. } => AppError::Conflict(err.to_string()),
            ServiceError::AlreadyExists(message) => AppError::Conflict(message),
            err @ ServiceError::InsufficientParticipants { .. } => {
                AppError::Unprocessable(err.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
