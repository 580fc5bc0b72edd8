//! Cover image storage (port)

use async_trait::async_trait;

use crate::error::DomainError;

/// An uploaded cover image as received from the client.
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl CoverUpload {
    /// File extension for accepted image types, `None` for anything else.
    pub fn extension(&self) -> Option<&'static str> {
        match self.content_type.as_deref()? {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/webp" => Some("webp"),
            "image/gif" => Some("gif"),
            _ => None,
        }
    }

    pub fn check(&self) -> Result<&'static str, DomainError> {
        if self.bytes.is_empty() {
            return Err(DomainError::Validation("Cover image is empty".into()));
        }
        self.extension()
            .ok_or_else(|| DomainError::Validation("Cover must be a JPEG, PNG, WEBP or GIF image".into()))
    }
}

#[async_trait]
pub trait CoverStore: Send + Sync {
    /// Persists the image and returns the reference stored on the collection.
    async fn save(&self, upload: CoverUpload) -> Result<String, DomainError>;
    async fn remove(&self, reference: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rejects_non_images() {
        let upload = CoverUpload {
            file_name: Some("cover.pdf".into()),
            content_type: Some("application/pdf".into()),
            bytes: vec![1, 2, 3],
        };
        assert!(matches!(upload.check(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_check_accepts_png() {
        let upload = CoverUpload {
            file_name: Some("cover.png".into()),
            content_type: Some("image/png".into()),
            bytes: vec![137, 80, 78, 71],
        };
        assert_eq!(upload.check().unwrap(), "png");
    }
}
