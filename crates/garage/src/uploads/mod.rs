//! Image upload fan-out and the image store backends.
//!
//! [`ImageUploader`] validates a batch, writes every file concurrently through
//! the configured [`ImageStore`] and waits for all of them. Exactly one backend
//! is active per process, chosen by `STORAGE_BACKEND`.

mod azure;
mod local;
mod s3;

pub use azure::AzureBlobStore;
pub use local::LocalImageStore;
pub use s3::S3ImageStore;

use std::{sync::Arc, time::Duration};

use futures_util::future::join_all;
use garage_core::{
    car::ImageDescriptor,
    upload::{generate_key, validate_batch, ImageStore, StoreError, UploadError, UploadFile},
};

use crate::config::ImageBackendConfig;

/// Uploads batches of images through one backend.
#[derive(Clone)]
pub struct ImageUploader {
    store: Arc<dyn ImageStore>,
    timeout: Duration,
}

impl ImageUploader {
    /// `timeout` bounds each backend write, not the whole batch.
    pub fn new(store: Arc<dyn ImageStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Name of the active backend.
    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// Writes every file and returns their descriptors in input order.
    ///
    /// The batch is validated as a whole before anything is written. If any
    /// write fails the call fails; objects already written stay in the
    /// backend and their keys are logged.
    pub async fn upload(&self, files: &[UploadFile]) -> Result<Vec<ImageDescriptor>, UploadError> {
        validate_batch(files)?;

        let keys: Vec<String> = files
            .iter()
            .map(|file| generate_key(&file.file_name, file.content_type.as_deref()))
            .collect();

        let results = join_all(
            files
                .iter()
                .zip(&keys)
                .map(|(file, key)| self.put_with_timeout(key, file)),
        )
        .await;

        let total = results.len();
        let mut descriptors = Vec::with_capacity(total);
        let mut failed = 0;
        for (result, key) in results.into_iter().zip(&keys) {
            match result {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(err) => {
                    failed += 1;
                    tracing::error!(
                        backend = self.backend(),
                        key = %key,
                        error = %err,
                        "Image upload failed"
                    );
                }
            }
        }

        if failed > 0 {
            let orphaned: Vec<&str> = descriptors.iter().map(|d| d.key.as_str()).collect();
            if !orphaned.is_empty() {
                tracing::warn!(
                    backend = self.backend(),
                    orphaned = ?orphaned,
                    "Batch failed; already written objects were left in place"
                );
            }
            return Err(UploadError::BatchFailed { failed, total });
        }

        tracing::info!(backend = self.backend(), count = total, "Uploaded images");
        Ok(descriptors)
    }

    async fn put_with_timeout(
        &self,
        key: &str,
        file: &UploadFile,
    ) -> Result<ImageDescriptor, StoreError> {
        tokio::time::timeout(self.timeout, self.store.put(key, file))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}

/// Builds the image store selected by configuration.
pub async fn build_image_store(
    config: &ImageBackendConfig,
) -> Result<Arc<dyn ImageStore>, anyhow::Error> {
    let store: Arc<dyn ImageStore> = match config {
        ImageBackendConfig::Local { dir, url_prefix } => {
            Arc::new(LocalImageStore::new(dir, url_prefix))
        }
        ImageBackendConfig::S3 {
            region,
            bucket,
            public_url,
            access_key_id,
            secret_access_key,
        } => {
            let credentials = access_key_id.clone().zip(secret_access_key.clone());
            Arc::new(
                S3ImageStore::connect(region, bucket, public_url.clone(), credentials).await,
            )
        }
        ImageBackendConfig::Azure {
            connection_string,
            container,
        } => Arc::new(AzureBlobStore::from_connection_string(
            connection_string,
            container,
        )?),
    };

    tracing::info!(backend = store.name(), "Image store ready");
    Ok(store)
}

/// An in-process store for tests.
#[cfg(test)]
pub mod testing {
    use std::collections::{HashMap, HashSet};

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;

    /// Keeps objects in a map; file names listed in `failing` are refused.
    #[derive(Default)]
    pub struct MemoryImageStore {
        pub objects: Mutex<HashMap<String, Vec<u8>>>,
        pub failing: HashSet<String>,
        pub delay: Option<Duration>,
    }

    impl MemoryImageStore {
        pub fn failing_on(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|n| n.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ImageStore for MemoryImageStore {
        fn name(&self) -> &'static str {
            "memory"
        }

        async fn put(&self, key: &str, file: &UploadFile) -> Result<ImageDescriptor, StoreError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.contains(&file.file_name) {
                return Err(StoreError::Backend(format!("refused {}", file.file_name)));
            }
            self.objects
                .lock()
                .await
                .insert(key.to_string(), file.data.to_vec());
            Ok(ImageDescriptor::new(format!("/memory/{key}"), key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryImageStore;
    use super::*;

    fn image(name: &str) -> UploadFile {
        UploadFile::new(name, Some("image/png".to_string()), name.as_bytes().to_vec())
    }

    fn uploader(store: MemoryImageStore) -> (ImageUploader, Arc<MemoryImageStore>) {
        let store = Arc::new(store);
        (
            ImageUploader::new(store.clone(), Duration::from_secs(5)),
            store,
        )
    }

    #[tokio::test]
    async fn test_ten_files_keep_input_order() {
        let (uploader, store) = uploader(MemoryImageStore::default());
        let files: Vec<_> = (0..10).map(|i| image(&format!("photo{i}.png"))).collect();

        let descriptors = uploader.upload(&files).await.unwrap();

        assert_eq!(descriptors.len(), 10);
        let objects = store.objects.lock().await;
        for (descriptor, file) in descriptors.iter().zip(&files) {
            assert!(descriptor.key.ends_with(".png"));
            assert_eq!(descriptor.url, format!("/memory/{}", descriptor.key));
            assert_eq!(objects[&descriptor.key], file.data.to_vec());
        }
    }

    #[tokio::test]
    async fn test_invalid_batch_writes_nothing() {
        let (uploader, store) = uploader(MemoryImageStore::default());
        let files = vec![
            image("a.png"),
            UploadFile::new("b.txt", Some("text/plain".to_string()), b"hi".to_vec()),
        ];

        let err = uploader.upload(&files).await.unwrap_err();

        assert!(matches!(err, UploadError::InvalidContentType { .. }));
        assert!(store.objects.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_eleven_files_rejected() {
        let (uploader, _) = uploader(MemoryImageStore::default());
        let files: Vec<_> = (0..11).map(|i| image(&format!("{i}.png"))).collect();

        assert_eq!(
            uploader.upload(&files).await.unwrap_err(),
            UploadError::TooManyFiles { count: 11 }
        );
    }

    #[tokio::test]
    async fn test_one_failure_fails_the_batch() {
        let (uploader, store) = uploader(MemoryImageStore::failing_on(&["b.png"]));
        let files = vec![image("a.png"), image("b.png"), image("c.png")];

        let err = uploader.upload(&files).await.unwrap_err();

        assert_eq!(err, UploadError::BatchFailed { failed: 1, total: 3 });
        // The other writes still happened.
        assert_eq!(store.objects.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let store = Arc::new(MemoryImageStore {
            delay: Some(Duration::from_millis(200)),
            ..MemoryImageStore::default()
        });
        let uploader = ImageUploader::new(store, Duration::from_millis(20));

        let err = uploader.upload(&[image("a.png")]).await.unwrap_err();

        assert_eq!(err, UploadError::BatchFailed { failed: 1, total: 1 });
    }

    #[tokio::test]
    async fn test_local_backend_is_built_from_config() {
        let config = ImageBackendConfig::Local {
            dir: "public/uploads".to_string(),
            url_prefix: "/uploads".to_string(),
        };

        let store = build_image_store(&config).await.unwrap();

        assert_eq!(store.name(), "local");
    }
}
