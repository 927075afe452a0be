//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `garage_core::storage`. The implementation is selected at
//! compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): HashMaps behind a lock, nothing persisted
//! - `sqlite`: SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//! - `mongodb`: MongoDB storage backend using the official driver
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time.
//!
//! # Examples
//!
//! Build with SQLite:
//! ```bash
//! cargo build -p garage --no-default-features --features sqlite
//! ```
//!
//! Build with MongoDB:
//! ```bash
//! cargo build -p garage --no-default-features --features mongodb
//! ```

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "inmemory", feature = "sqlite"))]
compile_error!(
    "Features 'inmemory' and 'sqlite' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(all(feature = "inmemory", feature = "mongodb"))]
compile_error!(
    "Features 'inmemory' and 'mongodb' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(all(feature = "sqlite", feature = "mongodb"))]
compile_error!(
    "Features 'sqlite' and 'mongodb' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "sqlite", feature = "mongodb")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory', 'sqlite' or 'mongodb' feature. \
    Example: cargo build -p garage --no-default-features --features sqlite"
);

// Tests always run against the in-memory backend, whatever feature is active.
#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mongodb")]
pub mod mongodb;

#[cfg(any(feature = "inmemory", test))]
pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;

#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoRepository;
