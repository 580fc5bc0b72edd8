// ============================================================================
// Library Core - Collection Entity
// File: crates/library-core/src/domain/collection.rs
// Description: Catalogue entry (book, ebook, journal, thesis)
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    PhysicalBook,
    Ebook,
    Journal,
    Thesis,
}

impl CollectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionType::PhysicalBook => "physical_book",
            CollectionType::Ebook => "ebook",
            CollectionType::Journal => "journal",
            CollectionType::Thesis => "thesis",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "physical_book" => Some(CollectionType::PhysicalBook),
            "ebook" => Some(CollectionType::Ebook),
            "journal" => Some(CollectionType::Journal),
            "thesis" => Some(CollectionType::Thesis),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publication_year: String,
    pub isbn: Option<String>,
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
    pub category_id: i32,
    pub description: Option<String>,
    /// Reference returned by the cover store.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: Collection,
    pub category: Option<CategorySummary>,
}

fn validate_publication_year(year: &str) -> Result<(), ValidationError> {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("publication_year");
        err.message = Some("Publication year must be 4 digits (YYYY)".into());
        Err(err)
    }
}

/// Validated input for a new collection.
#[derive(Debug, Clone, Validate)]
pub struct CollectionDraft {
    #[validate(length(min = 3, max = 255, message = "Title must be between 3 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 2, max = 255, message = "Author must be between 2 and 255 characters"))]
    pub author: String,

    #[validate(length(min = 2, max = 150, message = "Publisher must be between 2 and 150 characters"))]
    pub publisher: String,

    #[validate(custom(function = "validate_publication_year"))]
    pub publication_year: String,

    #[validate(length(max = 20, message = "ISBN must be at most 20 characters"))]
    pub isbn: Option<String>,

    pub collection_type: CollectionType,

    #[validate(range(min = 1, message = "Category id must be positive"))]
    pub category_id: i32,

    pub description: Option<String>,

    /// Copies on the shelf; informational for physical books.
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
}

/// Partial update; only present fields change.
#[derive(Debug, Clone, Default, Validate)]
pub struct CollectionPatch {
    #[validate(length(min = 3, max = 255, message = "Title must be between 3 and 255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 2, max = 255, message = "Author must be between 2 and 255 characters"))]
    pub author: Option<String>,

    #[validate(length(min = 2, max = 150, message = "Publisher must be between 2 and 150 characters"))]
    pub publisher: Option<String>,

    #[validate(custom(function = "validate_publication_year"))]
    pub publication_year: Option<String>,

    #[validate(length(max = 20, message = "ISBN must be at most 20 characters"))]
    pub isbn: Option<String>,

    pub collection_type: Option<CollectionType>,

    #[validate(range(min = 1, message = "Category id must be positive"))]
    pub category_id: Option<i32>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
}

impl CollectionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.publication_year.is_none()
            && self.isbn.is_none()
            && self.collection_type.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
    }
}

impl Collection {
    pub fn apply_patch(&mut self, patch: CollectionPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(publisher) = patch.publisher {
            self.publisher = publisher;
        }
        if let Some(year) = patch.publication_year {
            self.publication_year = year;
        }
        if let Some(isbn) = patch.isbn {
            self.isbn = Some(isbn).filter(|i| !i.is_empty());
        }
        if let Some(collection_type) = patch.collection_type {
            self.collection_type = collection_type;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(description) = patch.description {
            self.description = Some(description).filter(|d| !d.is_empty());
        }
        self.updated_at = Utc::now();
    }
}
