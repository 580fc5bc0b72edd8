//! Category repository trait (port)

use async_trait::async_trait;
use crate::domain::{Category, CategoryInput};
use crate::error::DomainError;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, DomainError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, DomainError>;

    /// Exact, case-sensitive match.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError>;
    async fn create(&self, input: &CategoryInput) -> Result<Category, DomainError>;
    async fn update(&self, category: &Category) -> Result<Category, DomainError>;
    async fn delete(&self, id: i32) -> Result<bool, DomainError>;
    async fn count_collections(&self, id: i32) -> Result<i64, DomainError>;
}
