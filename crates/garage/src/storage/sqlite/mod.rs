//! SQLite storage backend implementation.
//!
//! This module provides a SQLite-based implementation of the repository traits
//! using `rusqlite` for synchronous operations and `tokio-rusqlite` for async wrapping.
//! Feature and image lists are stored as JSON text; the listing filter is
//! compiled to a parameterized `WHERE` clause.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
