use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the hex representation of a [`RecordId`].
pub const RECORD_ID_LEN: usize = 24;

/// Identifier of a stored record: 24 lowercase hexadecimal characters (96 bits).
///
/// The format matches document-store object ids, so ids generated here can be
/// stored natively by the MongoDB backend and ids coming from an existing
/// database parse without conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordIdError {
    #[error("Invalid ID format: expected a 24-character hexadecimal string")]
    InvalidFormat,
}

impl RecordId {
    /// Generates a new random id.
    pub fn new() -> Self {
        let bytes: [u8; RECORD_ID_LEN / 2] = rand::random();
        Self(hex::encode(bytes))
    }

    /// Parses an id, accepting upper or lower case hex.
    pub fn parse(value: &str) -> Result<Self, RecordIdError> {
        if value.len() != RECORD_ID_LEN || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RecordIdError::InvalidFormat);
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = RecordIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_24_lowercase_hex_chars() {
        let id = RecordId::new();
        assert_eq!(id.as_str().len(), RECORD_ID_LEN);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(RecordId::new(), RecordId::new());
    }

    #[test]
    fn parse_accepts_object_id_strings() {
        let id = RecordId::parse("65F1A2B3C4D5E6F708192A3B").unwrap();
        assert_eq!(id.as_str(), "65f1a2b3c4d5e6f708192a3b");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!(
            RecordId::parse("not-a-valid-id"),
            Err(RecordIdError::InvalidFormat)
        );
        assert!(RecordId::parse("65f1a2b3c4d5e6f708192a3").is_err());
        assert!(RecordId::parse("65f1a2b3c4d5e6f708192a3b0").is_err());
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(RecordId::parse("zzf1a2b3c4d5e6f708192a3b").is_err());
    }

    #[test]
    fn serde_uses_plain_string() {
        let id = RecordId::parse("65f1a2b3c4d5e6f708192a3b").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65f1a2b3c4d5e6f708192a3b\"");

        let back: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<RecordId>("\"short\"").is_err());
    }
}
