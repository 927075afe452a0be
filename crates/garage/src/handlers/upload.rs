use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use garage_core::car::ImageDescriptor;

use super::{multipart::read_upload_files, AppError};
use crate::state::AppState;

/// POST /api/upload - store up to ten images, descriptors in input order.
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<ImageDescriptor>>, AppError> {
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let files = read_upload_files(multipart).await?;

    tracing::debug!(count = files.len(), backend = state.uploader.backend(), "Upload request");

    Ok(Json(state.uploader.upload(&files).await?))
}
