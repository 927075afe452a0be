//! In-memory storage backend.
//!
//! Stores cars and enquiries in HashMaps wrapped in `Arc<RwLock<_>>`. Data is
//! lost when the process exits; useful for local runs (with `--seed`) and
//! tests.

mod repository;

pub use repository::InMemoryRepository;
