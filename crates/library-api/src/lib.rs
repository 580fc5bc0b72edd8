//! # Library API
//!
//! HTTP handlers, middleware, DTOs and the response envelope.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use response::ApiResponse;
pub use routes::build_router;
pub use state::{AppState, Ports};
