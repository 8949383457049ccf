use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tokio::{fs::File, io::AsyncWriteExt};
use uuid::Uuid;

const DEFAULT_EXTENSION: &str = "jpeg";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("File URL is required")]
    UrlRequired,
    #[error("File not found")]
    NotFound,
    #[error("image storage failed: {0}")]
    Io(#[from] io::Error),
}

/// Filesystem-backed store for uploaded images. Stored names are generated,
/// never user-supplied, so concurrent uploads cannot collide.
#[derive(Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist an upload and return its stored file name. Empty payloads and
    /// blank names are a soft reject: nothing is written and `None` comes
    /// back.
    pub async fn save(
        &self,
        bytes: &[u8],
        original_name: &str,
    ) -> Result<Option<String>, ImageError> {
        if bytes.is_empty() || original_name.trim().is_empty() {
            return Ok(None);
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let sanitized = sanitize_filename::sanitize(original_name);
        let extension = Path::new(&sanitized)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.root.join(&stored_name);

        let mut file = File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        Ok(Some(stored_name))
    }

    /// Read a stored image back by its bare file name.
    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>, ImageError> {
        let path = self.root.join(bare_file_name(file_name)?);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ImageError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete the stored file a previously issued URL points at. The file
    /// name is the last path segment of the URL.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), ImageError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ImageError::UrlRequired);
        }

        let file_name = trimmed
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or(ImageError::UrlRequired)?;

        let path = self.root.join(bare_file_name(file_name)?);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ImageError::NotFound),
            Err(err) => Err(err.into()),
        }
    }
}

/// Strip any directory components a caller may have smuggled in.
fn bare_file_name(input: &str) -> Result<&str, ImageError> {
    Path::new(input)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(ImageError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_and_read_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let stored = store
            .save(b"jpeg bytes", "portrait.jpg")
            .await
            .unwrap()
            .unwrap();

        assert!(stored.ends_with(".jpg"));
        assert_eq!(store.read(&stored).await.unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn empty_payload_stores_nothing() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(store.save(b"", "portrait.jpg").await.unwrap().is_none());
        assert!(store.save(b"bytes", "  ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn identical_original_names_never_collide() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let first = store.save(b"one", "photo.jpeg").await.unwrap().unwrap();
        let second = store.save(b"two", "photo.jpeg").await.unwrap().unwrap();

        assert_ne!(first, second);
        assert_eq!(store.read(&first).await.unwrap(), b"one");
        assert_eq!(store.read(&second).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn missing_extension_defaults_to_jpeg() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let stored = store.save(b"bytes", "portrait").await.unwrap().unwrap();

        assert!(stored.ends_with(".jpeg"));
    }

    #[tokio::test]
    async fn read_of_a_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(matches!(
            store.read("nope.jpeg").await,
            Err(ImageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_by_url_requires_input() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(matches!(
            store.delete_by_url("   ").await,
            Err(ImageError::UrlRequired)
        ));
    }

    #[tokio::test]
    async fn delete_by_url_reports_missing_files() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(matches!(
            store
                .delete_by_url("http://localhost:8080/home/get/gone.jpeg")
                .await,
            Err(ImageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_by_url_removes_the_stored_file() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let stored = store.save(b"bytes", "photo.png").await.unwrap().unwrap();

        store
            .delete_by_url(&format!("http://localhost:8080/home/get/{stored}"))
            .await
            .unwrap();

        assert!(matches!(
            store.read(&stored).await,
            Err(ImageError::NotFound)
        ));
    }
}
