//! Error → HTTP mapping
//!
//! Domain failures are classified by `ErrorKind` only; the body is always the
//! standard envelope with `success: false`.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use library_core::{DomainError, ErrorKind};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Too many requests, please try again later")]
    RateLimited,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::UpstreamTimeout => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::AlreadyCheckedIn => StatusCode::CONFLICT,
        ErrorKind::Upstream | ErrorKind::Unconfigured | ErrorKind::Persistence | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, data): (StatusCode, String, Option<Value>) = match self {
            ApiError::Domain(err) => {
                let status = status_for(err.kind());
                match err {
                    DomainError::AlreadyCheckedIn(existing) => {
                        let data = serde_json::to_value(&*existing).ok();
                        (status, "Guest already checked in today".to_string(), data)
                    }
                    DomainError::Persistence(_) | DomainError::Internal(_) => {
                        error!("Request failed: {}", err);
                        (status, "Internal server error".to_string(), None)
                    }
                    other => (status, other.to_string(), None),
                }
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, ApiError::RateLimited.to_string(), None),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", message);
        } else {
            warn!(status = status.as_u16(), "{}", message);
        }

        (status, Json(ApiResponse::failure(message, data))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Domain(errors.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::UpstreamTimeout), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::AlreadyCheckedIn), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Upstream), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::Persistence), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response = ApiError::from(DomainError::Persistence("pg: connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
