//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use garage_core::auth::{AdminClaims, AuthError as CoreError};

use crate::{token::decode_token, AuthError, AuthState};

/// Extractor for the signed-in admin. Rejects with 401 when the cookie is
/// missing or fails verification.
///
/// Behind [`crate::admin_gate`] the claims the gate already verified are
/// reused.
pub struct AdminSession(pub AdminClaims);

impl<S> FromRequestParts<S> for AdminSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<AdminClaims>() {
            return Ok(AdminSession(claims.clone()));
        }

        let auth_state = AuthState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        verify_session(&auth_state, &jar).map(AdminSession)
    }
}

/// Reads the admin cookie from `jar` and verifies it.
pub(crate) fn verify_session(state: &AuthState, jar: &CookieJar) -> Result<AdminClaims, AuthError> {
    let secret = state
        .config
        .jwt_secret
        .as_deref()
        .ok_or(CoreError::NotConfigured("JWT_SECRET"))?;

    let cookie = jar
        .get(&state.config.cookie_name)
        .ok_or_else(|| CoreError::InvalidToken("no admin cookie".to_string()))?;

    decode_token(cookie.value(), secret, Utc::now())
}
