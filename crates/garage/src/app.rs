use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::{get, post, put},
    Router,
};
use garage_auth::{admin_gate, auth_routes};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeader,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        cars::{create_car, delete_car, get_car, list_cars, update_car},
        enquiries::{create_enquiry, get_enquiry, list_enquiries, update_enquiry_status},
        health::{healthz, livez},
        pages::{admin_index, cars_page, enquiries_page, login_page},
        upload::upload_images,
    },
    state::AppState,
};

/// Request body ceiling for multipart routes: ten 5 MB images plus form
/// fields and part headers.
const MULTIPART_BODY_LIMIT: usize = 60 * 1024 * 1024;

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    // API routes with CORS. Multipart routes get a larger body limit than
    // axum's default.
    let api_routes = Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route(
            "/cars/{id}",
            get(get_car)
                .delete(delete_car)
                .merge(put(update_car).layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT))),
        )
        .route("/enquiry", get(list_enquiries).post(create_enquiry))
        .route(
            "/enquiry/{id}",
            get(get_enquiry).patch(update_enquiry_status),
        )
        .route(
            "/upload",
            post(upload_images).layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        .layer(cors);

    // Admin pages, all behind the cookie gate
    let admin_pages = Router::new()
        .route("/admin", get(admin_index))
        .route("/admin/login", get(login_page))
        .route("/admin/cars", get(cars_page))
        .route("/admin/enquiries", get(enquiries_page))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            admin_gate,
        ));

    let mut app = Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .merge(auth_routes())
        .merge(admin_pages);

    // Local uploads are served back under their URL prefix, typed by
    // extension only
    if let Some(local) = &state.local_uploads {
        let uploads = SetResponseHeader::overriding(
            ServeDir::new(&local.dir),
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        app = app.nest_service(&local.url_prefix, uploads);
    }

    let request_timeout = state.request_timeout;

    app.layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}
