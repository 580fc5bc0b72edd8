pub mod health;
pub mod auth;
pub mod categories;
pub mod collections;
pub mod guests;
pub mod members;
