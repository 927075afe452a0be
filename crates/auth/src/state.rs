//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::AuthConfig;

/// Shared state for auth handlers and the admin gate.
#[derive(Clone, Default)]
pub struct AuthState {
    pub config: Arc<AuthConfig>,
}

impl AuthState {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
