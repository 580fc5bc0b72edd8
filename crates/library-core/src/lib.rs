//! # Library Core
//!
//! Domain entities, services, and port traits for the library backend.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod gateway;
pub mod storage;
pub mod error;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind, GatewayError};
pub use gateway::IdentityGateway;
pub use storage::{CoverStore, CoverUpload};
