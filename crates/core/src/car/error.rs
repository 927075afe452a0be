use thiserror::Error;

/// An enumerated field received a value outside its allowed set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid {field} '{value}' (expected one of: {allowed})")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
    pub allowed: &'static str,
}

/// A price that is negative, not finite, or not a number at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid price '{0}' (expected a non-negative number)")]
pub struct InvalidPrice(pub String);

/// Errors that can occur when decoding or validating a car listing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CarError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid numeric value for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error(transparent)]
    InvalidValue(#[from] ParseEnumError),
    #[error("Invalid features list: {0}")]
    InvalidFeatures(String),
    #[error("Invalid images list: {0}")]
    InvalidImages(String),
}
