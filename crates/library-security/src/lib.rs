//! # Library Security
//!
//! Session token issuance and validation.

pub mod jwt;

pub use jwt::{Claims, JwtError, JwtService};
