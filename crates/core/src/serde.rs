//! Serde helper functions for form and query deserialization.
//!
//! HTML forms and query strings send empty strings for blank inputs; these
//! helpers treat them as absent.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Returns the trimmed value, or None when it is blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        string_field: Option<String>,
    }

    #[test]
    fn test_empty_string_becomes_none() {
        let json = r#"{"string_field": ""}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_whitespace_string_becomes_none() {
        let json = r#"{"string_field": "   "}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_valid_string_preserved() {
        let json = r#"{"string_field": "Toyota"}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, Some("Toyota".to_string()));
    }

    #[test]
    fn test_missing_field_is_none() {
        let result: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_non_blank_trims() {
        assert_eq!(non_blank(Some("  VIN1 ".into())), Some("VIN1".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
