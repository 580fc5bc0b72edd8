//! Guest log repository trait (port)

use async_trait::async_trait;
use chrono::NaiveDate;
use library_shared::Pagination;
use crate::domain::{FacultyCount, GuestLog, MajorCount, NewGuestLog};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuestLogRepository: Send + Sync {
    /// Newest visit first.
    async fn list(&self, page: Pagination) -> Result<Vec<GuestLog>, DomainError>;
    async fn count(&self) -> Result<i64, DomainError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<GuestLog>, DomainError>;
    async fn find_for_day(&self, email: &str, day: NaiveDate) -> Result<Option<GuestLog>, DomainError>;

    /// A second log for the same email and day surfaces as `DomainError::Conflict`.
    async fn create(&self, log: &NewGuestLog) -> Result<GuestLog, DomainError>;
    async fn delete(&self, id: i32) -> Result<bool, DomainError>;
    async fn count_by_faculty(&self) -> Result<Vec<FacultyCount>, DomainError>;
    async fn count_by_major(&self) -> Result<Vec<MajorCount>, DomainError>;
}
