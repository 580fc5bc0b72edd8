//! # Library Infrastructure
//!
//! PostgreSQL repositories, the campus identity client and the cover file
//! store (adapters).

pub mod database;
pub mod gateway;
pub mod storage;

pub use database::{
    create_pool, run_migrations, PgCategoryRepository, PgCollectionRepository, PgGuestLogRepository,
    PgMemberRepository, PgUserRepository,
};
pub use gateway::CampusGateway;
pub use storage::LocalCoverStore;
