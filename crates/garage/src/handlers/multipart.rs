//! Multipart decoding for the upload and car update endpoints.

use axum::extract::{multipart::Field, Multipart};
use garage_core::{car::CarForm, upload::UploadFile};

use super::AppError;

/// Part name carrying images on `POST /api/upload`.
pub const FILES_FIELD: &str = "files";

/// Part name carrying images to append on `PUT /api/cars/{id}`.
pub const NEW_IMAGES_FIELD: &str = "newImages";

/// Collects every `files` part. Other parts are ignored.
pub async fn read_upload_files(mut multipart: Multipart) -> Result<Vec<UploadFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() == Some(FILES_FIELD) {
            files.push(read_file(field).await?);
        }
    }

    Ok(files)
}

/// Splits the car update form into its text fields and any `newImages` parts.
///
/// A `newImages` part without a file name and without content is what a
/// browser sends for an empty file input; it is skipped.
pub async fn read_car_form(
    mut multipart: Multipart,
) -> Result<(CarForm, Vec<UploadFile>), AppError> {
    let mut form = CarForm::default();
    let mut new_images = Vec::new();

    while let Some(field) = next_field(&mut multipart).await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == NEW_IMAGES_FIELD {
            let file = read_file(field).await?;
            if file.file_name.is_empty() && file.data.is_empty() {
                continue;
            }
            new_images.push(file);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if !form.set(&name, value) {
            tracing::debug!(field = %name, "Ignoring unknown car form field");
        }
    }

    Ok((form, new_images))
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, AppError> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

async fn read_file(field: Field<'_>) -> Result<UploadFile, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    Ok(UploadFile::new(file_name, content_type, data))
}
