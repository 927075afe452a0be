pub mod cars;
pub mod enquiries;
pub mod error;
pub mod health;
pub mod multipart;
pub mod pages;
pub mod upload;

pub use error::AppError;

use garage_core::RecordId;

/// Parses a path id, answering 400 when it is not a record id.
fn parse_path_id(raw: &str, entity: &str) -> Result<RecordId, AppError> {
    RecordId::parse(raw).map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid {entity} ID format. Expected a 24-character hexadecimal string."
        ))
    })
}
