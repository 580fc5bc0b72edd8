//! Translation of `sqlx` failures into domain errors.
//!
//! Classification uses the driver's constraint codes, never message text.

use library_core::DomainError;
use tracing::{error, warn};

/// What a violated constraint means to the caller of `operation`.
pub struct ConstraintMessages<'a> {
    pub unique: &'a str,
    pub foreign_key: &'a str,
}

impl ConstraintMessages<'static> {
    pub const GENERIC: Self = ConstraintMessages {
        unique: "Record already exists",
        foreign_key: "Referenced record not found",
    };
}

pub fn map_db_error(operation: &str, err: sqlx::Error, messages: ConstraintMessages<'_>) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            warn!(operation, constraint = db_err.constraint().unwrap_or("-"), "Unique violation");
            return DomainError::Conflict(messages.unique.to_string());
        }
        if db_err.is_foreign_key_violation() {
            warn!(operation, constraint = db_err.constraint().unwrap_or("-"), "Foreign key violation");
            return DomainError::Validation(messages.foreign_key.to_string());
        }
    }

    error!(operation, "Database error: {}", err);
    DomainError::Persistence(err.to_string())
}

/// Shorthand for failures where no constraint is expected.
pub fn db_error(operation: &str, err: sqlx::Error) -> DomainError {
    map_db_error(operation, err, ConstraintMessages::GENERIC)
}
