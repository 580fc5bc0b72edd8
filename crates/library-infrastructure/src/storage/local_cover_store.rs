//! Cover images on the local filesystem, served back under a public path.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, error};
use uuid::Uuid;

use library_core::error::DomainError;
use library_core::storage::{CoverStore, CoverUpload};
use library_shared::config::UploadSettings;

pub struct LocalCoverStore {
    dir: PathBuf,
    public_path: String,
}

impl LocalCoverStore {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            dir: PathBuf::from(&settings.dir),
            public_path: settings.public_path.trim_end_matches('/').to_string(),
        }
    }

    /// Maps a stored reference back to a file inside the upload directory.
    fn file_for(&self, reference: &str) -> Option<PathBuf> {
        let name = reference.strip_prefix(&self.public_path)?.strip_prefix('/')?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.dir.join(name))
    }
}

#[async_trait]
impl CoverStore for LocalCoverStore {
    async fn save(&self, upload: CoverUpload) -> Result<String, DomainError> {
        let ext = upload.check()?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            error!(dir = %self.dir.display(), "Cannot create upload directory: {}", e);
            DomainError::Internal("Cannot store cover image".into())
        })?;

        let name = format!("cover-{}.{}", Uuid::new_v4(), ext);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &upload.bytes).await.map_err(|e| {
            error!(path = %path.display(), "Cannot write cover image: {}", e);
            DomainError::Internal("Cannot store cover image".into())
        })?;

        debug!(path = %path.display(), bytes = upload.bytes.len(), "Cover stored");
        Ok(format!("{}/{}", self.public_path, name))
    }

    async fn remove(&self, reference: &str) -> Result<(), DomainError> {
        let Some(path) = self.file_for(reference) else {
            debug!(reference, "Not a local cover reference, skipping removal");
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Internal(format!("Cannot remove cover image: {}", e))),
        }
    }
}
