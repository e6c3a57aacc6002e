use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::api::error::ErrorBody;
use tracing::{error, warn};

use crate::store::StoreError;

pub struct AppError {
    pub code: StatusCode,
    pub message: String,
}

impl AppError {
    /// Return a json response error message
    pub fn new<S: Into<String>>(code: StatusCode, message: S) -> Self {
        AppError { code, message: message.into() }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppError {}: {}", self.code, self.message)
    }
}

// Render AppError into a response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.code, Json(ErrorBody::new(self.message))).into_response()
    }
}

// Store errors never reach the caller verbatim. Anything that isn't a missing
// row is logged here and reported as a generic failure
impl From<StoreError> for AppError {
    #[track_caller]
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            warn!(%err);
            AppError::new(StatusCode::NOT_FOUND, "workout not found")
        } else {
            error!(%err, "Store operation failed");
            AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        warn!(%err, "Rejected path");
        AppError::bad_request("invalid workout ID")
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        warn!(%err, "Rejected body");
        AppError::bad_request("invalid workout data")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::from(StoreError::WorkoutNotFound(3));
        assert_eq!(err.code, StatusCode::NOT_FOUND);

        let err = AppError::from(StoreError::EntryNotFound { workout_id: 3, entry_id: 4 });
        assert_eq!(err.code, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_failure_is_generic_500() {
        let err = AppError::from(StoreError::DeadpoolInteract("secret detail".into()));
        assert_eq!(err.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("secret"));
    }
}
