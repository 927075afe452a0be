//! MongoDB error mapping.
//!
//! Maps `mongodb::error::Error` to `RepositoryError` from `garage_core::storage`.

use garage_core::storage::RepositoryError;
use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Maps a driver error to a RepositoryError.
///
/// # Error Mapping
///
/// - duplicate key (code 11000) → `RepositoryError::AlreadyExists`
/// - server selection / I/O / DNS failures → `RepositoryError::ConnectionFailed`
/// - BSON (de)serialization failures → `RepositoryError::Serialization`
/// - All other errors → `RepositoryError::QueryFailed`
pub fn map_mongo_error(err: Error, entity_type: &'static str, id: impl Into<String>) -> RepositoryError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY =>
        {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id.into(),
            }
        }
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
            RepositoryError::ConnectionFailed(err.to_string())
        }
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
            RepositoryError::Serialization(err.to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
