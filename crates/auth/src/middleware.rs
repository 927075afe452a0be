//! Gate for the admin pages.
//!
//! Every request routed through the gate must carry a valid admin cookie,
//! except the login page itself. Anything else is redirected to the login
//! page.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{extractors::verify_session, AuthState};

/// Axum middleware function guarding the admin pages.
///
/// Install with `axum::middleware::from_fn_with_state`. On success the
/// verified claims are stored in the request extensions.
pub async fn admin_gate(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == state.config.login_path {
        return next.run(request).await;
    }

    match verify_session(&state, &jar) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(error) => {
            tracing::warn!(
                path = %request.uri().path(),
                %error,
                "Admin gate redirecting to login"
            );
            Redirect::to(&state.config.login_path).into_response()
        }
    }
}
