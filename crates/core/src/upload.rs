//! Image upload policy.
//!
//! Batch limits, per-file checks and key generation live here; the actual
//! writes go through an [`ImageStore`] implemented by the server crate for
//! each backend.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::car::ImageDescriptor;

/// Maximum number of files accepted in one upload call.
pub const MAX_FILES_PER_BATCH: usize = 10;

/// Maximum size of a single image, in bytes.
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted image types and the extension each is stored under.
///
/// Anything a browser could render as active content (SVG, HTML) is absent.
const IMAGE_TYPES: [(&str, &str); 6] = [
    ("image/jpeg", "jpg"),
    ("image/pjpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
];

/// One file part received from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Errors that can occur when uploading a batch of images.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No files provided")]
    NoFiles,
    #[error("Maximum 10 files allowed")]
    TooManyFiles { count: usize },
    #[error("File '{file_name}' is not an image (content type: {content_type})")]
    InvalidContentType {
        file_name: String,
        content_type: String,
    },
    #[error("File '{file_name}' is {size} bytes, larger than the 5 MB limit")]
    FileTooLarge { file_name: String, size: usize },
    #[error("File '{file_name}' is empty")]
    EmptyFile { file_name: String },
    #[error("Failed to upload {failed} of {total} files")]
    BatchFailed { failed: usize, total: usize },
}

impl UploadError {
    /// Whether the caller is at fault (as opposed to the storage backend).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::BatchFailed { .. })
    }
}

/// Errors raised by a storage backend while writing one object.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),
}

/// Checks the whole batch before anything is written.
///
/// A batch is rejected as a unit: no files, more than
/// [`MAX_FILES_PER_BATCH`], or any single file that is not an image, is empty,
/// or exceeds [`MAX_FILE_SIZE`].
pub fn validate_batch(files: &[UploadFile]) -> Result<(), UploadError> {
    if files.is_empty() {
        return Err(UploadError::NoFiles);
    }
    if files.len() > MAX_FILES_PER_BATCH {
        return Err(UploadError::TooManyFiles { count: files.len() });
    }

    files.iter().try_for_each(validate_file)
}

fn validate_file(file: &UploadFile) -> Result<(), UploadError> {
    let content_type = file.content_type.as_deref().unwrap_or_default();
    if image_extension(content_type).is_none() {
        return Err(UploadError::InvalidContentType {
            file_name: file.file_name.clone(),
            content_type: if content_type.is_empty() {
                "unknown".to_string()
            } else {
                content_type.to_string()
            },
        });
    }
    if file.data.is_empty() {
        return Err(UploadError::EmptyFile {
            file_name: file.file_name.clone(),
        });
    }
    if file.size() > MAX_FILE_SIZE {
        return Err(UploadError::FileTooLarge {
            file_name: file.file_name.clone(),
            size: file.size(),
        });
    }
    Ok(())
}

/// Stored extension for an accepted image type, ignoring parameters and case.
fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next()?.trim();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

/// Generates a storage key: 128 random bits, hex-encoded, plus an image
/// extension.
///
/// The extension follows the declared content type, so a key always names
/// the type the object is served as. The file name is only consulted when no
/// type was given, and then only for a known image extension.
pub fn generate_key(file_name: &str, content_type: Option<&str>) -> String {
    let name = hex::encode(rand::random::<[u8; 16]>());

    match content_type
        .and_then(image_extension)
        .or_else(|| extension_from_name(file_name))
    {
        Some(ext) => format!("{name}.{ext}"),
        None => name,
    }
}

fn extension_from_name(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.trim();
    if ext.eq_ignore_ascii_case("jpeg") {
        return Some("jpg");
    }
    IMAGE_TYPES
        .iter()
        .map(|(_, known)| *known)
        .find(|known| known.eq_ignore_ascii_case(ext))
}

/// A storage backend for uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;

    /// Writes one object under `key` and returns its descriptor.
    async fn put(&self, key: &str, file: &UploadFile) -> Result<ImageDescriptor, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, size: usize) -> UploadFile {
        UploadFile::new(name, Some("image/jpeg".to_string()), vec![0u8; size])
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(validate_batch(&[]), Err(UploadError::NoFiles));
    }

    #[test]
    fn test_batch_of_ten_accepted_and_eleven_rejected() {
        let ten: Vec<_> = (0..10).map(|i| image(&format!("{i}.jpg"), 16)).collect();
        assert!(validate_batch(&ten).is_ok());

        let eleven: Vec<_> = (0..11).map(|i| image(&format!("{i}.jpg"), 16)).collect();
        assert_eq!(
            validate_batch(&eleven),
            Err(UploadError::TooManyFiles { count: 11 })
        );
        assert_eq!(
            UploadError::TooManyFiles { count: 11 }.to_string(),
            "Maximum 10 files allowed"
        );
    }

    #[test]
    fn test_non_image_rejects_whole_batch() {
        let files = vec![
            image("a.jpg", 16),
            UploadFile::new("notes.pdf", Some("application/pdf".to_string()), vec![1u8; 4]),
        ];
        assert_eq!(
            validate_batch(&files),
            Err(UploadError::InvalidContentType {
                file_name: "notes.pdf".to_string(),
                content_type: "application/pdf".to_string(),
            })
        );
    }

    #[test]
    fn test_only_raster_image_types_accepted() {
        for accepted in ["image/jpeg", "IMAGE/PNG", "image/webp; q=1", "image/avif"] {
            let file = UploadFile::new("a", Some(accepted.to_string()), vec![1u8; 4]);
            assert!(validate_batch(&[file]).is_ok(), "{accepted}");
        }
        for rejected in ["image/svg+xml", "image/", "image/x-icon", "text/html"] {
            let file = UploadFile::new("a", Some(rejected.to_string()), vec![1u8; 4]);
            assert!(
                matches!(
                    validate_batch(&[file]),
                    Err(UploadError::InvalidContentType { .. })
                ),
                "{rejected}"
            );
        }
    }

    #[test]
    fn test_missing_content_type_rejected() {
        let files = vec![UploadFile::new("a.jpg", None, vec![1u8; 4])];
        assert!(matches!(
            validate_batch(&files),
            Err(UploadError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate_batch(&[image("max.jpg", MAX_FILE_SIZE)]).is_ok());
        assert_eq!(
            validate_batch(&[image("big.jpg", MAX_FILE_SIZE + 1)]),
            Err(UploadError::FileTooLarge {
                file_name: "big.jpg".to_string(),
                size: MAX_FILE_SIZE + 1,
            })
        );
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(matches!(
            validate_batch(&[image("zero.jpg", 0)]),
            Err(UploadError::EmptyFile { .. })
        ));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(UploadError::NoFiles.is_client_error());
        assert!(!UploadError::BatchFailed { failed: 1, total: 2 }.is_client_error());
    }

    #[test]
    fn test_generate_key_keeps_extension() {
        let key = generate_key("Photo.JPG", Some("image/jpeg"));
        let (name, ext) = key.split_once('.').unwrap();
        assert_eq!(name.len(), 32);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn test_generate_key_follows_content_type() {
        assert!(generate_key("blob", Some("image/png")).ends_with(".png"));
        assert!(generate_key("x.html", Some("image/png")).ends_with(".png"));
        assert!(generate_key("photo.gif", Some("image/jpeg")).ends_with(".jpg"));
        assert!(generate_key("../../etc/passwd", Some("image/webp")).ends_with(".webp"));
    }

    #[test]
    fn test_generate_key_without_type_only_keeps_image_extensions() {
        assert!(generate_key("photo.JPEG", None).ends_with(".jpg"));
        assert!(generate_key("photo.webp", None).ends_with(".webp"));
        assert_eq!(generate_key("page.html", None).len(), 32);
        assert_eq!(generate_key("icon.svg", Some("image/svg+xml")).len(), 32);
        assert_eq!(generate_key("noext", None).len(), 32);
    }

    #[test]
    fn test_generate_key_is_unique() {
        assert_ne!(generate_key("a.jpg", None), generate_key("a.jpg", None));
    }
}
