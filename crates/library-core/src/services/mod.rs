//! Domain services (business logic)

pub mod identity_sync;
pub mod auth_service;
pub mod category_service;
pub mod collection_service;
pub mod guest_service;
pub mod member_service;

pub use identity_sync::{IdentitySyncService, SyncedAccount};
pub use auth_service::{AuthService, LoginOutcome};
pub use category_service::CategoryService;
pub use collection_service::CollectionService;
pub use guest_service::GuestService;
pub use member_service::MemberService;
