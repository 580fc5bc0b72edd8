//! Repository traits (ports)

pub mod user_repository;
pub mod member_repository;
pub mod category_repository;
pub mod collection_repository;
pub mod guest_log_repository;

pub use user_repository::UserRepository;
pub use member_repository::MemberRepository;
pub use category_repository::CategoryRepository;
pub use collection_repository::CollectionRepository;
pub use guest_log_repository::GuestLogRepository;

#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use member_repository::MockMemberRepository;
#[cfg(test)]
pub use guest_log_repository::MockGuestLogRepository;
