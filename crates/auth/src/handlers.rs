//! HTTP handlers for auth routes.

use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use garage_core::auth::{credentials_match, issue_claims, AuthError as CoreError, LoginRequest};
use serde_json::{json, Value};

use crate::{error::AuthError, token::encode_token, AuthState};

/// Creates the auth router.
///
/// Routes:
/// - `POST /api/admin/login` - Check credentials and set the admin cookie
/// - `POST /api/admin/logout` - Clear the admin cookie
pub fn auth_routes<S>() -> Router<S>
where
    AuthState: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
}

async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), AuthError> {
    let config = &state.config;
    let (Some(admin_email), Some(admin_password), Some(secret)) = (
        config.admin_email.as_deref(),
        config.admin_password.as_deref(),
        config.jwt_secret.as_deref(),
    ) else {
        return Err(CoreError::NotConfigured("ADMIN_EMAIL, ADMIN_PASSWORD or JWT_SECRET").into());
    };

    let Json(request) = payload.map_err(|e| AuthError::BadRequest(e.body_text()))?;

    if !credentials_match(admin_email, admin_password, &request.email, &request.password) {
        return Err(CoreError::InvalidCredentials.into());
    }

    let ttl = chrono::Duration::seconds(config.token_ttl.as_secs() as i64);
    let claims = issue_claims(admin_email, Utc::now(), ttl);
    let token = encode_token(&claims, secret)?;

    let cookie = Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(config.token_ttl.as_secs() as i64))
        .build();

    tracing::info!(email = %admin_email, "Admin logged in");
    Ok((jar.add(cookie), Json(json!({ "success": true }))))
}

async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let cookie = Cookie::build(state.config.cookie_name.clone()).path("/");
    (jar.remove(cookie), Json(json!({ "success": true })))
}
