use thiserror::Error;

use crate::RecordIdError;

/// Errors that can occur when decoding or validating an enquiry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnquiryError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid car ID format. Expected a 24-character hexadecimal string.")]
    InvalidCarId,
    #[error("Invalid status '{0}' (expected one of: new, contacted, closed)")]
    InvalidStatus(String),
}

impl From<RecordIdError> for EnquiryError {
    fn from(_: RecordIdError) -> Self {
        Self::InvalidCarId
    }
}
