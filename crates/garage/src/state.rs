//! Application state.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. Repositories are trait objects; the concrete backend is
//! picked at compile time by the storage feature (see `storage`).

use std::{sync::Arc, time::Duration};

use garage_auth::{AuthConfig, AuthState};
use garage_core::{
    storage::{CarRepository, EnquiryRepository},
    upload::ImageStore,
};

use crate::{
    config::{Config, ImageBackendConfig},
    services::{CarService, EnquiryService},
    uploads::{build_image_store, ImageUploader},
};

/// Local upload directory served back over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUploads {
    pub dir: String,
    pub url_prefix: String,
}

/// Shared application state.
///
/// Cloned for each request; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cars: CarService,
    pub enquiries: EnquiryService,
    pub uploader: ImageUploader,
    pub auth: AuthState,
    /// Name of the compiled-in storage backend.
    pub storage_backend: &'static str,
    /// Set when images are written to local disk.
    pub local_uploads: Option<LocalUploads>,
    pub request_timeout: Duration,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    fn from_parts(
        cars: Arc<dyn CarRepository>,
        enquiries: Arc<dyn EnquiryRepository>,
        storage_backend: &'static str,
        image_store: Arc<dyn ImageStore>,
        auth: AuthConfig,
        config: &Config,
    ) -> Self {
        let local_uploads = match &config.images {
            ImageBackendConfig::Local { dir, url_prefix } => Some(LocalUploads {
                dir: dir.clone(),
                url_prefix: url_prefix.clone(),
            }),
            _ => None,
        };

        Self {
            cars: CarService::new(cars.clone()),
            enquiries: EnquiryService::new(enquiries, cars),
            uploader: ImageUploader::new(image_store, config.upload_timeout),
            auth: AuthState::new(auth),
            storage_backend,
            local_uploads,
            request_timeout: config.request_timeout,
        }
    }

    async fn build(
        cars: Arc<dyn CarRepository>,
        enquiries: Arc<dyn EnquiryRepository>,
        storage_backend: &'static str,
        config: &Config,
    ) -> Result<Self, anyhow::Error> {
        let image_store = build_image_store(&config.images).await?;

        let auth = AuthConfig::from_env();
        if !auth.is_configured() {
            tracing::warn!("ADMIN_EMAIL, ADMIN_PASSWORD or JWT_SECRET is unset; admin login is disabled");
        }

        tracing::info!(
            storage = storage_backend,
            images = image_store.name(),
            "Application state ready"
        );

        Ok(Self::from_parts(
            cars,
            enquiries,
            storage_backend,
            image_store,
            auth,
            config,
        ))
    }
}

// ============================================================================
// Factory functions for each storage backend
// ============================================================================

#[cfg(feature = "inmemory")]
mod inmemory {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage. Nothing survives a restart.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repo = Arc::new(InMemoryRepository::new());
            Self::build(repo.clone(), repo, "inmemory", config).await
        }
    }
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            Self::build(repo.clone(), repo, "sqlite", config).await
        }
    }
}

#[cfg(feature = "mongodb")]
mod mongo {
    use super::*;
    use crate::storage::MongoRepository;

    impl AppState {
        /// Creates AppState with MongoDB storage. Connects once; the driver
        /// pools connections for every request after that.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repo =
                Arc::new(MongoRepository::connect(&config.mongodb_uri, &config.mongodb_database).await?);
            Self::build(repo.clone(), repo, "mongodb", config).await
        }
    }
}

// ============================================================================
// Test support
// ============================================================================

#[cfg(test)]
mod test_support {
    use super::*;
    use crate::storage::InMemoryRepository;
    use crate::uploads::testing::MemoryImageStore;

    impl AppState {
        /// In-memory state with a custom image store.
        pub fn with_image_store(store: Arc<dyn ImageStore>) -> Self {
            let repo = Arc::new(InMemoryRepository::new());
            let config = Config::from_lookup(|_| None).unwrap();
            Self::from_parts(
                repo.clone(),
                repo,
                "inmemory",
                store,
                AuthConfig::with_credentials("admin@example.com", "hunter2", "test-secret"),
                &config,
            )
        }
    }

    impl Default for AppState {
        /// In-memory storage, an in-process image store and a configured
        /// admin account (`admin@example.com` / `hunter2`).
        fn default() -> Self {
            Self::with_image_store(Arc::new(MemoryImageStore::default()))
        }
    }
}
