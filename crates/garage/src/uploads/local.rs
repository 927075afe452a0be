use std::path::PathBuf;

use async_trait::async_trait;
use garage_core::{
    car::ImageDescriptor,
    upload::{ImageStore, StoreError, UploadFile},
};

/// Writes images to a directory on local disk.
///
/// The router serves the same directory under `url_prefix`, so the returned
/// root-relative URLs resolve.
pub struct LocalImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn put(&self, key: &str, file: &UploadFile) -> Result<ImageDescriptor, StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(key), &file.data).await?;

        tracing::debug!(key, size = file.size(), dir = %self.dir.display(), "Wrote image to disk");

        Ok(ImageDescriptor::new(
            format!("{}/{key}", self.url_prefix),
            key,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_file_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().join("uploads"), "/uploads");
        let file = UploadFile::new("car.jpg", Some("image/jpeg".to_string()), b"jpeg".to_vec());

        let descriptor = store.put("abc123.jpg", &file).await.unwrap();

        assert_eq!(descriptor, ImageDescriptor::new("/uploads/abc123.jpg", "abc123.jpg"));
        let written = std::fs::read(dir.path().join("uploads").join("abc123.jpg")).unwrap();
        assert_eq!(written, b"jpeg");
    }

    #[tokio::test]
    async fn test_put_into_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let store = LocalImageStore::new(&blocker, "/uploads");
        let file = UploadFile::new("car.jpg", Some("image/jpeg".to_string()), b"jpeg".to_vec());

        let err = store.put("abc.jpg", &file).await.unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
    }
}
