//! User repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Member, NewMember, User};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Inserts the user and, when given, its member row atomically.
    ///
    /// A duplicate email surfaces as `DomainError::Conflict` and leaves nothing behind.
    async fn create_with_member(
        &self,
        user: &User,
        member: Option<NewMember>,
    ) -> Result<(User, Option<Member>), DomainError>;

    async fn update(&self, user: &User) -> Result<User, DomainError>;
}
