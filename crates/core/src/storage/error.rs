use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    pub fn car_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Car",
            id: id.to_string(),
        }
    }

    pub fn enquiry_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Enquiry",
            id: id.to_string(),
        }
    }

    /// A unique-index violation on the car VIN.
    pub fn duplicate_vin(vin: impl ToString) -> Self {
        Self::AlreadyExists {
            entity_type: "Car",
            id: vin.to_string(),
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::car_not_found("65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(error.to_string(), "Car not found: 65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::duplicate_vin("JTDKBRFU9K3012345");
        assert_eq!(error.to_string(), "Car already exists: JTDKBRFU9K3012345");
    }

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 30s");
    }

    #[test]
    fn test_repository_error_serialization_display() {
        let error = RepositoryError::Serialization("missing field `vin`".to_string());
        assert_eq!(error.to_string(), "Serialization error: missing field `vin`");
    }
}
