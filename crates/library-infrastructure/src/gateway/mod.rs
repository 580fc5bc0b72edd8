//! Outbound adapters for the campus identity service

pub mod campus_client;

pub use campus_client::CampusGateway;
