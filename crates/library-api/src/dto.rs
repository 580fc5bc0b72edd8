//! Request payloads

use std::collections::HashMap;

use axum::extract::Multipart;
use library_core::domain::{CollectionDraft, CollectionPatch, CollectionType};
use library_core::CoverUpload;
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;

/// `POST /auth/google-callback`
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// `POST /guests`
#[derive(Debug, Deserialize, Validate)]
pub struct CheckInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Multipart body of `POST /collections` and `PATCH /collections/{id}`.
///
/// Every text part arrives as a string; numbers are coerced here.
#[derive(Debug, Default)]
pub struct CollectionForm {
    fields: HashMap<String, String>,
    pub cover: Option<CoverUpload>,
}

const COVER_FIELD: &str = "cover";

impl CollectionForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = CollectionForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == COVER_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string).or_else(|| {
                    file_name
                        .as_deref()
                        .and_then(|f| mime_guess::from_path(f).first())
                        .map(|m| m.essence_str().to_string())
                });
                let bytes = field.bytes().await?.to_vec();
                if !bytes.is_empty() {
                    form.cover = Some(CoverUpload { file_name, content_type, bytes });
                }
                continue;
            }

            let value = field.text().await?;
            form.fields.insert(name, value);
        }

        Ok(form)
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            cover: None,
        }
    }

    fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).map(|v| v.trim().to_string())
    }

    /// Optional text where an empty value counts as absent.
    fn optional(&self, key: &str) -> Option<String> {
        self.text(key).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ApiError> {
        self.text(key)
            .ok_or_else(|| ApiError::BadRequest(format!("{} is required", key)))
    }

    fn number(&self, key: &str) -> Result<Option<i32>, ApiError> {
        self.optional(key)
            .map(|v| {
                v.parse::<i32>()
                    .map_err(|_| ApiError::BadRequest(format!("{} must be a number", key)))
            })
            .transpose()
    }

    fn collection_type(&self) -> Result<Option<CollectionType>, ApiError> {
        self.optional("type")
            .map(|v| {
                CollectionType::from_str(&v).ok_or_else(|| {
                    ApiError::BadRequest("type must be one of physical_book, ebook, journal, thesis".into())
                })
            })
            .transpose()
    }

    pub fn to_draft(&self) -> Result<CollectionDraft, ApiError> {
        Ok(CollectionDraft {
            title: self.required("title")?,
            author: self.required("author")?,
            publisher: self.required("publisher")?,
            publication_year: self.required("publicationYear")?,
            isbn: self.optional("isbn"),
            collection_type: self
                .collection_type()?
                .ok_or_else(|| ApiError::BadRequest("type is required".into()))?,
            category_id: self
                .number("categoryId")?
                .ok_or_else(|| ApiError::BadRequest("categoryId is required".into()))?,
            description: self.optional("description"),
            quantity: self.number("quantity")?,
        })
    }

    pub fn to_patch(&self) -> Result<CollectionPatch, ApiError> {
        Ok(CollectionPatch {
            title: self.optional("title"),
            author: self.optional("author"),
            publisher: self.optional("publisher"),
            publication_year: self.optional("publicationYear"),
            isbn: self.text("isbn"),
            collection_type: self.collection_type()?,
            category_id: self.number("categoryId")?,
            description: self.text("description"),
            quantity: self.number("quantity")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_coerces_numbers() {
        let form = CollectionForm::from_pairs(&[
            ("title", "Clean Code"),
            ("author", "Robert C. Martin"),
            ("publisher", "Prentice Hall"),
            ("publicationYear", "2008"),
            ("type", "physical_book"),
            ("categoryId", " 3 "),
            ("quantity", "2"),
        ]);

        let draft = form.to_draft().unwrap();
        assert_eq!(draft.category_id, 3);
        assert_eq!(draft.quantity, Some(2));
        assert_eq!(draft.collection_type, CollectionType::PhysicalBook);
        assert!(draft.isbn.is_none());
    }

    #[test]
    fn test_non_numeric_category_rejected() {
        let form = CollectionForm::from_pairs(&[
            ("title", "Clean Code"),
            ("author", "Robert C. Martin"),
            ("publisher", "Prentice Hall"),
            ("publicationYear", "2008"),
            ("type", "ebook"),
            ("categoryId", "abc"),
        ]);
        assert!(matches!(form.to_draft(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_patch_only_has_sent_fields() {
        let form = CollectionForm::from_pairs(&[("publisher", "Pearson")]);
        let patch = form.to_patch().unwrap();
        assert_eq!(patch.publisher.as_deref(), Some("Pearson"));
        assert!(patch.title.is_none());
        assert!(patch.category_id.is_none());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let form = CollectionForm::from_pairs(&[("type", "vinyl")]);
        assert!(form.to_patch().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        assert!(LoginRequest { email: "nope".into() }.validate().is_err());
        assert!(LoginRequest { email: "a@campus.ac.id".into() }.validate().is_ok());
    }
}
