//! Admin pages rendered with askama.
//!
//! Everything here sits behind `admin_gate`; the login page is the one path
//! the gate lets through.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use garage_auth::AdminSession;
use garage_core::{
    car::{Car, Price},
    enquiry::EnquiryWithCar,
    filter::ListCarsQuery,
};

use super::AppError;
use crate::state::AppState;

const CARS_PAGE: &str = "/admin/cars";

/// Template wrapper that converts Askama templates into HTML responses.
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to render template");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to render page".to_string(),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "admin/login.html")]
struct LoginTemplate {
    /// Where the browser goes after a successful login.
    landing: &'static str,
}

/// One row of the cars table.
struct CarRow {
    id: String,
    title: String,
    price: Price,
    mileage: u64,
    fuel_type: &'static str,
    transmission: &'static str,
    vin: String,
    image_count: usize,
    /// First image URL, empty when the car has none.
    thumbnail: String,
}

impl From<Car> for CarRow {
    fn from(car: Car) -> Self {
        Self {
            id: car.id.to_string(),
            title: car.title(),
            price: car.price,
            mileage: car.mileage,
            fuel_type: car.fuel_type.as_str(),
            transmission: car.transmission.as_str(),
            image_count: car.images.len(),
            thumbnail: car
                .images
                .first()
                .map(|image| image.url.clone())
                .unwrap_or_default(),
            vin: car.vin,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/cars.html")]
struct CarsTemplate {
    admin: String,
    cars: Vec<CarRow>,
}

/// One row of the enquiries table.
struct EnquiryRow {
    id: String,
    car: String,
    name: String,
    email: String,
    phone: String,
    message: String,
    status: &'static str,
    received: String,
}

impl From<EnquiryWithCar> for EnquiryRow {
    fn from(enquiry: EnquiryWithCar) -> Self {
        let car = enquiry
            .car()
            .map(Car::title)
            .unwrap_or_else(|| "Deleted listing".to_string());

        Self {
            id: enquiry.id.to_string(),
            car,
            name: enquiry.name,
            email: enquiry.email,
            phone: enquiry.phone.unwrap_or_default(),
            message: enquiry.message,
            status: enquiry.status.as_str(),
            received: enquiry.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/enquiries.html")]
struct EnquiriesTemplate {
    admin: String,
    enquiries: Vec<EnquiryRow>,
}

/// GET /admin/login
pub async fn login_page() -> impl IntoResponse {
    HtmlTemplate(LoginTemplate {
        landing: CARS_PAGE,
    })
}

/// GET /admin - the cars table is the landing page.
pub async fn admin_index() -> Redirect {
    Redirect::to(CARS_PAGE)
}

/// GET /admin/cars
pub async fn cars_page(
    AdminSession(claims): AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let cars = state.cars.list(ListCarsQuery::default()).await?;

    Ok(HtmlTemplate(CarsTemplate {
        admin: claims.sub,
        cars: cars.into_iter().map(CarRow::from).collect(),
    }))
}

/// GET /admin/enquiries
pub async fn enquiries_page(
    AdminSession(claims): AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let enquiries = state.enquiries.list().await?;

    Ok(HtmlTemplate(EnquiriesTemplate {
        admin: claims.sub,
        enquiries: enquiries.into_iter().map(EnquiryRow::from).collect(),
    }))
}
