//! # Library Shared
//!
//! Shared configuration, telemetry, types and helpers for the library backend.

pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
