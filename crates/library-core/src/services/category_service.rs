// ============================================================================
// Library Core - Category Service
// File: crates/library-core/src/services/category_service.rs
// ============================================================================

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::domain::{Caller, Category, CategoryInput, LIBRARY_STAFF};
use crate::error::DomainError;
use crate::repositories::CategoryRepository;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Category not found".into()))
    }

    pub async fn create(&self, caller: &Caller, input: CategoryInput) -> Result<Category, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;

        let input = input.normalized();
        input.validate()?;

        if self.categories.find_by_name(&input.name).await?.is_some() {
            return Err(duplicate_name(&input.name));
        }

        // The unique index still decides when two requests race past the check.
        let category = self
            .categories
            .create(&input)
            .await
            .map_err(|e| if e.is_conflict() { duplicate_name(&input.name) } else { e })?;

        info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update(&self, caller: &Caller, id: i32, input: CategoryInput) -> Result<Category, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;

        let input = input.normalized();
        input.validate()?;

        let mut category = self.get_by_id(id).await?;

        if let Some(other) = self.categories.find_by_name(&input.name).await? {
            if other.id != id {
                return Err(duplicate_name(&input.name));
            }
        }

        category.name = input.name;
        category.description = input.description;
        category.updated_at = chrono::Utc::now();

        let updated = self
            .categories
            .update(&category)
            .await
            .map_err(|e| if e.is_conflict() { duplicate_name(&category.name) } else { e })?;

        info!(category_id = updated.id, "Category updated");
        Ok(updated)
    }

    /// Deletes a category that no collection references.
    pub async fn delete(&self, caller: &Caller, id: i32) -> Result<(), DomainError> {
        caller.require_any(LIBRARY_STAFF)?;

        self.get_by_id(id).await?;

        let used_by = self.categories.count_collections(id).await?;
        if used_by > 0 {
            warn!(category_id = id, used_by, "Refusing to delete category in use");
            return Err(DomainError::Conflict(format!(
                "Category is used by {} collection(s)",
                used_by
            )));
        }

        if !self.categories.delete(id).await? {
            return Err(DomainError::NotFound("Category not found".into()));
        }

        info!(category_id = id, "Category deleted");
        Ok(())
    }
}

fn duplicate_name(name: &str) -> DomainError {
    DomainError::Conflict(format!("Category '{}' already exists", name))
}
