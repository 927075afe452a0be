//! Car listing handlers.

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, rejection::QueryRejection,
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use garage_core::{
    car::{Car, NewCar},
    filter::ListCarsQuery,
};
use serde_json::{json, Value};

use super::{multipart::read_car_form, parse_path_id, AppError};
use crate::state::AppState;

/// GET /api/cars - cars matching the query filters, newest first.
pub async fn list_cars(
    State(state): State<AppState>,
    query: Result<Query<ListCarsQuery>, QueryRejection>,
) -> Result<Json<Vec<Car>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let cars = state.cars.list(query).await?;
    Ok(Json(cars))
}

/// POST /api/cars - create a car from a JSON body.
pub async fn create_car(
    State(state): State<AppState>,
    payload: Result<Json<NewCar>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::debug!(?request, "Create car request");

    let car = state.cars.create(request).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

/// GET /api/cars/{id}
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Car>, AppError> {
    let id = parse_path_id(&id, "car")?;
    Ok(Json(state.cars.get(&id).await?))
}

/// PUT /api/cars/{id} - full replace from a multipart form.
///
/// Files sent as `newImages` are uploaded first and appended after the
/// `images` list (or the stored list when `images` is absent). The car and
/// VIN are checked before any file is written.
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Car>, AppError> {
    let id = parse_path_id(&id, "car")?;
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let (form, new_images) = read_car_form(multipart).await?;
    let mut update = form.into_update().map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !new_images.is_empty() {
        let existing = state.cars.load_for_update(&id, &update.vin).await?;
        let uploaded = state.uploader.upload(&new_images).await?;

        let mut images = update.images.take().unwrap_or(existing.images);
        images.extend(uploaded);
        update.images = Some(images);
    }

    Ok(Json(state.cars.update(&id, update).await?))
}

/// DELETE /api/cars/{id}
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_path_id(&id, "car")?;
    state.cars.delete(&id).await?;
    Ok(Json(json!({ "message": "Car deleted successfully" })))
}
