//! # Library Core - Domain Module
//!
//! Domain entities for the library backend.

pub mod user;
pub mod member;
pub mod category;
pub mod collection;
pub mod guest_log;
pub mod identity;
pub mod caller;

// Re-export all entities and enums
pub use user::{User, Role, UserStatus, UserChanges};
pub use member::{Member, MemberType, NewMember, MemberProfile, ProfileUpdate, MemberDraft, MemberPatch};
pub use category::{Category, CategoryInput};
pub use collection::{
    Collection, CollectionType, CollectionDetail, CategorySummary, CollectionDraft, CollectionPatch,
};
pub use guest_log::{GuestLog, NewGuestLog, GuestPage, GuestStats, FacultyCount, MajorCount};
pub use identity::ExternalIdentity;
pub use caller::{Caller, LIBRARY_STAFF, SUPER_ADMIN_ONLY};
