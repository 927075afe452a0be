use std::{env, time::Duration};

use thiserror::Error;

/// Errors that can occur while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown STORAGE_BACKEND '{0}' (expected one of: local, s3, azure)")]
    UnknownBackend(String),
    #[error("{0} must be set for the selected image backend")]
    Missing(&'static str),
    #[error("Invalid UPLOAD_URL_PREFIX '{0}' (expected a path such as /uploads)")]
    InvalidUrlPrefix(String),
}

/// Top-level paths owned by the router that uploads must not shadow.
const RESERVED_PREFIXES: [&str; 4] = ["/api", "/admin", "/livez", "/healthz"];

/// Normalizes `UPLOAD_URL_PREFIX` to `/segment[/segment..]` with no trailing
/// slash, rejecting anything the router cannot mount.
fn url_prefix(raw: &str) -> Result<String, ConfigError> {
    let prefix = raw.trim().trim_end_matches('/');
    let mountable = prefix.starts_with('/')
        && !prefix.contains("//")
        && !prefix
            .contains(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | '*' | '?' | '#'));
    let reserved = RESERVED_PREFIXES
        .iter()
        .any(|r| prefix == *r || prefix.starts_with(&format!("{r}/")));

    if !mountable || reserved {
        return Err(ConfigError::InvalidUrlPrefix(raw.to_string()));
    }
    Ok(prefix.to_string())
}

/// Where uploaded images are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageBackendConfig {
    /// Files on local disk, served back under `url_prefix`.
    Local { dir: String, url_prefix: String },
    S3 {
        region: String,
        bucket: String,
        /// Base URL for object links; the AWS virtual-hosted URL when `None`.
        public_url: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    },
    Azure {
        connection_string: String,
        container: String,
    },
}

impl ImageBackendConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::S3 { .. } => "s3",
            Self::Azure { .. } => "azure",
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file (default: "garage.db")
    pub sqlite_path: String,
    /// MongoDB connection string (default: "mongodb://localhost:27017/garage")
    pub mongodb_uri: String,
    /// Database used when the URI names none (default: "garage")
    pub mongodb_database: String,
    pub images: ImageBackendConfig,
    /// Upper bound for a single backend write.
    pub upload_timeout: Duration,
    /// Upper bound for a whole request.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SQLITE_PATH` - SQLite database path (default: "garage.db")
    /// - `MONGODB_URI` - MongoDB connection string
    /// - `MONGODB_DATABASE` - MongoDB database name (default: "garage")
    /// - `STORAGE_BACKEND` - `local`, `s3` or `azure` (default: "local")
    /// - `UPLOAD_DIR`, `UPLOAD_URL_PREFIX` - local backend (default: "public/uploads", "/uploads")
    /// - `AWS_REGION`, `AWS_S3_BUCKET`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `S3_PUBLIC_URL` - S3 backend
    /// - `AZURE_STORAGE_CONNECTION_STRING`, `AZURE_STORAGE_CONTAINER_NAME` - Azure backend
    /// - `UPLOAD_TIMEOUT_SECS` - per-file backend timeout (default: 30)
    /// - `REQUEST_TIMEOUT_SECS` - whole-request timeout (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));
        let seconds = |name: &str, default: u64| {
            var(name)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let backend = var("STORAGE_BACKEND").unwrap_or_else(|| "local".to_string());
        let images = match backend.trim().to_ascii_lowercase().as_str() {
            "local" => ImageBackendConfig::Local {
                dir: var("UPLOAD_DIR").unwrap_or_else(|| "public/uploads".to_string()),
                url_prefix: var("UPLOAD_URL_PREFIX")
                    .map(|p| url_prefix(&p))
                    .transpose()?
                    .unwrap_or_else(|| "/uploads".to_string()),
            },
            "s3" => ImageBackendConfig::S3 {
                region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                bucket: required("AWS_S3_BUCKET")?,
                public_url: var("S3_PUBLIC_URL").map(|u| u.trim_end_matches('/').to_string()),
                access_key_id: var("AWS_ACCESS_KEY_ID"),
                secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            },
            "azure" => ImageBackendConfig::Azure {
                connection_string: required("AZURE_STORAGE_CONNECTION_STRING")?,
                container: var("AZURE_STORAGE_CONTAINER_NAME").unwrap_or_else(|| "cars".to_string()),
            },
            _ => return Err(ConfigError::UnknownBackend(backend)),
        };

        Ok(Self {
            sqlite_path: var("SQLITE_PATH").unwrap_or_else(|| "garage.db".to_string()),
            mongodb_uri: var("MONGODB_URI")
                .unwrap_or_else(|| "mongodb://localhost:27017/garage".to_string()),
            mongodb_database: var("MONGODB_DATABASE").unwrap_or_else(|| "garage".to_string()),
            images,
            upload_timeout: Duration::from_secs(seconds("UPLOAD_TIMEOUT_SECS", 30)),
            request_timeout: Duration::from_secs(seconds("REQUEST_TIMEOUT_SECS", 60)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.sqlite_path, "garage.db");
        assert_eq!(config.mongodb_uri, "mongodb://localhost:27017/garage");
        assert_eq!(config.mongodb_database, "garage");
        assert_eq!(
            config.images,
            ImageBackendConfig::Local {
                dir: "public/uploads".to_string(),
                url_prefix: "/uploads".to_string(),
            }
        );
        assert_eq!(config.upload_timeout, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_s3_backend() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "S3"),
            ("AWS_REGION", "eu-west-1"),
            ("AWS_S3_BUCKET", "garage-images"),
            ("S3_PUBLIC_URL", "https://cdn.example.com/"),
        ])
        .unwrap();

        assert_eq!(
            config.images,
            ImageBackendConfig::S3 {
                region: "eu-west-1".to_string(),
                bucket: "garage-images".to_string(),
                public_url: Some("https://cdn.example.com".to_string()),
                access_key_id: None,
                secret_access_key: None,
            }
        );
        assert_eq!(config.images.name(), "s3");
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let err = config_from(&[("STORAGE_BACKEND", "s3")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AWS_S3_BUCKET"));
    }

    #[test]
    fn test_azure_backend_defaults_container() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "azure"),
            ("AZURE_STORAGE_CONNECTION_STRING", "AccountName=acct;AccountKey=a2V5"),
        ])
        .unwrap();

        match config.images {
            ImageBackendConfig::Azure { container, .. } => assert_eq!(container, "cars"),
            other => panic!("expected azure backend, got {other:?}"),
        }
    }

    #[test]
    fn test_azure_backend_requires_connection_string() {
        let err = config_from(&[("STORAGE_BACKEND", "azure")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AZURE_STORAGE_CONNECTION_STRING"));
    }

    #[test]
    fn test_unknown_backend() {
        let err = config_from(&[("STORAGE_BACKEND", "ftp")]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownBackend("ftp".to_string()));
    }

    #[test]
    fn test_upload_url_prefix_is_normalized() {
        let config = config_from(&[("UPLOAD_URL_PREFIX", " /media/cars/ ")]).unwrap();
        assert_eq!(
            config.images,
            ImageBackendConfig::Local {
                dir: "public/uploads".to_string(),
                url_prefix: "/media/cars".to_string(),
            }
        );
    }

    #[test]
    fn test_unmountable_upload_url_prefix_rejected() {
        for prefix in ["/", "uploads", "//", "/up loads", "/{id}", "/api", "/admin/files"] {
            let err = config_from(&[("UPLOAD_URL_PREFIX", prefix)]).unwrap_err();
            assert_eq!(err, ConfigError::InvalidUrlPrefix(prefix.to_string()), "{prefix}");
        }
        assert!(config_from(&[("UPLOAD_URL_PREFIX", "/apiary")]).is_ok());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("SQLITE_PATH", ""),
            ("UPLOAD_TIMEOUT_SECS", "abc"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.sqlite_path, "garage.db");
        assert_eq!(config.upload_timeout, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
