//! Domain errors

use thiserror::Error;

use crate::domain::GuestLog;

/// Classification the transport layer switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    AlreadyCheckedIn,
    Unauthorized,
    Forbidden,
    UpstreamTimeout,
    Upstream,
    Unconfigured,
    Persistence,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Guest already checked in today")]
    AlreadyCheckedIn(Box<GuestLog>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Campus API request timeout")]
    UpstreamTimeout,

    #[error("Campus API error: {0}")]
    Upstream(String),

    #[error("{0} is not configured")]
    Unconfigured(String),

    #[error("Database error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::AlreadyCheckedIn(_) => ErrorKind::AlreadyCheckedIn,
            DomainError::Unauthorized(_) => ErrorKind::Unauthorized,
            DomainError::Forbidden(_) => ErrorKind::Forbidden,
            DomainError::UpstreamTimeout => ErrorKind::UpstreamTimeout,
            DomainError::Upstream(_) => ErrorKind::Upstream,
            DomainError::Unconfigured(_) => ErrorKind::Unconfigured,
            DomainError::Persistence(_) => ErrorKind::Persistence,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(errors.to_string())
    }
}

/// Failures of the campus identity gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Invalid email format")]
    InvalidInput,

    #[error("Campus API base URL is not configured")]
    Unconfigured,

    #[error("Campus API request timeout")]
    UpstreamTimeout,

    #[error("Campus API error: {status}")]
    UpstreamError { status: u16 },

    #[error("User not found in Campus API")]
    NotFound,

    #[error("Failed to connect to Campus API: {0}")]
    Transport(String),
}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidInput => DomainError::Validation(err.to_string()),
            GatewayError::Unconfigured => DomainError::Unconfigured("Campus API base URL".into()),
            GatewayError::UpstreamTimeout => DomainError::UpstreamTimeout,
            GatewayError::UpstreamError { status } => DomainError::Upstream(format!("status {}", status)),
            GatewayError::NotFound => DomainError::NotFound(err.to_string()),
            GatewayError::Transport(msg) => DomainError::Upstream(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_errors_keep_their_kind() {
        assert_eq!(DomainError::from(GatewayError::InvalidInput).kind(), ErrorKind::Validation);
        assert_eq!(DomainError::from(GatewayError::Unconfigured).kind(), ErrorKind::Unconfigured);
        assert_eq!(DomainError::from(GatewayError::UpstreamTimeout).kind(), ErrorKind::UpstreamTimeout);
        assert_eq!(
            DomainError::from(GatewayError::UpstreamError { status: 503 }).kind(),
            ErrorKind::Upstream
        );
        assert_eq!(DomainError::from(GatewayError::NotFound).kind(), ErrorKind::NotFound);
    }
}
