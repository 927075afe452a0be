use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Auth errors for the garage_auth crate.
///
/// This wraps the core `AuthError` and adds the token encoding failures that
/// can't be in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (configuration, credentials, claims)
    #[error(transparent)]
    Core(#[from] garage_core::auth::AuthError),

    /// Token signing failed
    #[error("failed to sign admin token: {0}")]
    Signing(String),

    /// Request body could not be read as a login request
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use garage_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::NotConfigured(_) => {
                    tracing::error!("Auth error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server configuration error".to_string(),
                    )
                }
                CoreError::InvalidCredentials => {
                    tracing::warn!("Rejected admin login");
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
                }
                CoreError::InvalidToken(_) | CoreError::TokenExpired | CoreError::NotAdmin => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
                }
            },
            AuthError::Signing(_) => {
                tracing::error!("Auth error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
