// ============================================================================
// Library Core - Collection Service
// File: crates/library-core/src/services/collection_service.rs
// ============================================================================
//! Catalogue management, including cover images

use std::sync::Arc;

use library_shared::constants::COLLECTION_LIST_LIMIT;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::{Caller, Collection, CollectionDetail, CollectionDraft, CollectionPatch, LIBRARY_STAFF};
use crate::error::DomainError;
use crate::repositories::{CategoryRepository, CollectionRepository};
use crate::storage::{CoverStore, CoverUpload};

pub struct CollectionService {
    collections: Arc<dyn CollectionRepository>,
    categories: Arc<dyn CategoryRepository>,
    covers: Arc<dyn CoverStore>,
}

impl CollectionService {
    pub fn new(
        collections: Arc<dyn CollectionRepository>,
        categories: Arc<dyn CategoryRepository>,
        covers: Arc<dyn CoverStore>,
    ) -> Self {
        Self { collections, categories, covers }
    }

    /// Newest first, with category, capped.
    pub async fn list(&self) -> Result<Vec<CollectionDetail>, DomainError> {
        self.collections.list(COLLECTION_LIST_LIMIT).await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<CollectionDetail, DomainError> {
        self.collections
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Collection not found".into()))
    }

    pub async fn create(
        &self,
        caller: &Caller,
        draft: CollectionDraft,
        cover: Option<CoverUpload>,
    ) -> Result<Collection, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        draft.validate()?;
        if let Some(cover) = &cover {
            cover.check()?;
        }

        self.ensure_category(draft.category_id).await?;

        let image = match cover {
            Some(cover) => Some(self.covers.save(cover).await?),
            None => None,
        };

        match self.collections.create(&draft, image.clone()).await {
            Ok(collection) => {
                info!(collection_id = collection.id, title = %collection.title, "Collection created");
                Ok(collection)
            }
            Err(e) => {
                if let Some(image) = image {
                    self.discard_cover(&image).await;
                }
                Err(e)
            }
        }
    }

    /// Partial update; a new cover replaces the old file.
    pub async fn update(
        &self,
        caller: &Caller,
        id: i32,
        patch: CollectionPatch,
        cover: Option<CoverUpload>,
    ) -> Result<CollectionDetail, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        patch.validate()?;
        if patch.is_empty() && cover.is_none() {
            return Err(DomainError::Validation("Nothing to update".into()));
        }
        if let Some(cover) = &cover {
            cover.check()?;
        }

        let mut collection = self.get_by_id(id).await?.collection;

        if let Some(category_id) = patch.category_id {
            if category_id != collection.category_id {
                self.ensure_category(category_id).await?;
            }
        }

        collection.apply_patch(patch);

        let previous_image = collection.image.clone();
        let new_image = match cover {
            Some(cover) => {
                let reference = self.covers.save(cover).await?;
                collection.image = Some(reference.clone());
                Some(reference)
            }
            None => None,
        };

        if let Err(e) = self.collections.update(&collection).await {
            if let Some(image) = new_image {
                self.discard_cover(&image).await;
            }
            return Err(e);
        }

        if new_image.is_some() {
            if let Some(old) = previous_image {
                self.discard_cover(&old).await;
            }
        }

        info!(collection_id = id, "Collection updated");
        self.get_by_id(id).await
    }

    pub async fn delete(&self, caller: &Caller, id: i32) -> Result<(), DomainError> {
        caller.require_any(LIBRARY_STAFF)?;

        let existing = self.get_by_id(id).await?;
        if !self.collections.delete(id).await? {
            return Err(DomainError::NotFound("Collection not found".into()));
        }

        if let Some(image) = existing.collection.image {
            self.discard_cover(&image).await;
        }

        info!(collection_id = id, "Collection deleted");
        Ok(())
    }

    async fn ensure_category(&self, category_id: i32) -> Result<(), DomainError> {
        match self.categories.find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::Validation("Category not found".into())),
        }
    }

    async fn discard_cover(&self, reference: &str) {
        if let Err(e) = self.covers.remove(reference).await {
            warn!(cover = reference, "Failed to remove cover image: {}", e);
        }
    }
}
