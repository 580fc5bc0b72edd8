//! Collection repository trait (port)

use async_trait::async_trait;
use crate::domain::{Collection, CollectionDetail, CollectionDraft};
use crate::error::DomainError;

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Newest first, at most `limit` rows, each with its category.
    async fn list(&self, limit: i64) -> Result<Vec<CollectionDetail>, DomainError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<CollectionDetail>, DomainError>;

    /// An unknown `category_id` surfaces as `DomainError::Validation`.
    async fn create(&self, draft: &CollectionDraft, image: Option<String>) -> Result<Collection, DomainError>;
    async fn update(&self, collection: &Collection) -> Result<Collection, DomainError>;
    async fn delete(&self, id: i32) -> Result<bool, DomainError>;
}
