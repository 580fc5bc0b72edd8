//! PostgreSQL repository implementations

pub mod user_repo_impl;
pub mod member_repo_impl;
pub mod category_repo_impl;
pub mod collection_repo_impl;
pub mod guest_log_repo_impl;

pub use user_repo_impl::PgUserRepository;
pub use member_repo_impl::PgMemberRepository;
pub use category_repo_impl::PgCategoryRepository;
pub use collection_repo_impl::PgCollectionRepository;
pub use guest_log_repo_impl::PgGuestLogRepository;
