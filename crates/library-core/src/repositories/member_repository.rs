//! Member repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Member, MemberProfile, NewMember};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Member>, DomainError>;
    async fn find_by_user_id(&self, user_id: &Uuid) -> Result<Option<Member>, DomainError>;
    async fn find_profile_by_user_id(&self, user_id: &Uuid) -> Result<Option<MemberProfile>, DomainError>;
    async fn list(&self) -> Result<Vec<Member>, DomainError>;

    /// A second member for the same user surfaces as `DomainError::Conflict`.
    async fn create(&self, member: &NewMember) -> Result<Member, DomainError>;
    async fn update(&self, member: &Member) -> Result<Member, DomainError>;
    async fn delete(&self, id: i32) -> Result<bool, DomainError>;
}
