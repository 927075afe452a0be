//! Enquiry handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use garage_core::enquiry::{EnquiryWithCar, NewEnquiry, UpdateEnquiryStatus};
use serde_json::json;

use super::{parse_path_id, AppError};
use crate::state::AppState;

/// POST /api/enquiry - public contact form.
pub async fn create_enquiry(
    State(state): State<AppState>,
    payload: Result<Json<NewEnquiry>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let enquiry = state.enquiries.create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Enquiry submitted successfully",
            "id": enquiry.id,
        })),
    ))
}

/// GET /api/enquiry - every enquiry with its car expanded.
pub async fn list_enquiries(
    State(state): State<AppState>,
) -> Result<Json<Vec<EnquiryWithCar>>, AppError> {
    Ok(Json(state.enquiries.list().await?))
}

/// GET /api/enquiry/{id}
pub async fn get_enquiry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EnquiryWithCar>, AppError> {
    let id = parse_path_id(&id, "enquiry")?;
    Ok(Json(state.enquiries.get(&id).await?))
}

/// PATCH /api/enquiry/{id} - move to another status.
pub async fn update_enquiry_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEnquiryStatus>, JsonRejection>,
) -> Result<Json<EnquiryWithCar>, AppError> {
    let id = parse_path_id(&id, "enquiry")?;
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    Ok(Json(state.enquiries.update_status(&id, request).await?))
}
