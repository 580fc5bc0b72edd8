//! Cover image storage adapters

pub mod local_cover_store;

pub use local_cover_store::LocalCoverStore;
