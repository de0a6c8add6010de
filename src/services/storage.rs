//! Image storage
//!
//! Uploaded images land in the configured upload directory under a generated
//! UUID filename, served back via `/uploads/<filename>`. Replacing an image
//! deletes the old file first, so the directory never accumulates orphans.

use anyhow::{Context, Result};
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::UploadConfig;

/// Error types for image storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// MIME type not in the allow-list
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    /// Upload exceeds the configured size limit
    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// Filename would escape the upload directory
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Filesystem store for uploaded images
pub struct ImageStore {
    config: UploadConfig,
}

impl ImageStore {
    /// Create a new image store
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Validate and persist an uploaded image, returning the stored filename.
    pub async fn save(&self, data: &[u8], content_type: &str) -> Result<String, StorageError> {
        if !self.config.is_type_allowed(content_type) {
            return Err(StorageError::UnsupportedType(content_type.to_string()));
        }

        let size = data.len() as u64;
        if size > self.config.max_file_size {
            return Err(StorageError::TooLarge {
                size,
                limit: self.config.max_file_size,
            });
        }

        tokio::fs::create_dir_all(&self.config.path)
            .await
            .with_context(|| {
                format!("Failed to create upload directory: {:?}", self.config.path)
            })?;

        let filename = format!(
            "{}.{}",
            Uuid::new_v4(),
            self.config.get_extension(content_type)
        );
        let path = self.config.path.join(&filename);

        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write upload: {:?}", path))?;

        Ok(filename)
    }

    /// Delete a stored image. Missing files are not an error.
    pub async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.path_for(filename)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::InternalError(
                anyhow::Error::new(e).context(format!("Failed to delete upload: {:?}", path)),
            )),
        }
    }

    /// Resolve a stored filename to its on-disk path.
    ///
    /// Rejects names that could escape the upload directory.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }
        Ok(self.config.path.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &std::path::Path) -> ImageStore {
        ImageStore::new(UploadConfig {
            path: dir.to_path_buf(),
            ..UploadConfig::default()
        })
    }

    #[tokio::test]
    async fn test_save_writes_file_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let filename = store.save(b"png-bytes", "image/png").await.unwrap();
        assert!(filename.ends_with(".png"));

        let written = tokio::fs::read(dir.path().join(&filename)).await.unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_save_rejects_disallowed_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let result = store.save(b"data", "application/zip").await;
        assert!(matches!(result, Err(StorageError::UnsupportedType(_))));
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(UploadConfig {
            path: dir.path().to_path_buf(),
            max_file_size: 4,
            ..UploadConfig::default()
        });

        let result = store.save(b"12345", "image/png").await;
        assert!(matches!(result, Err(StorageError::TooLarge { .. })));
    }

    #[tokio::test]
    async fn test_delete_is_quiet_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        store.delete("never-existed.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let filename = store.save(b"bytes", "image/jpeg").await.unwrap();
        assert!(dir.path().join(&filename).exists());

        store.delete(&filename).await.unwrap();
        assert!(!dir.path().join(&filename).exists());
    }

    #[tokio::test]
    async fn test_delete_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let result = store.delete("../outside.png").await;
        assert!(matches!(result, Err(StorageError::InvalidFilename(_))));
    }
}
