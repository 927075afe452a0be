//! Admin authentication for garage.
//!
//! This crate provides:
//! - Credential login against a single configured admin account
//! - Signed admin tokens carried in an http-only cookie
//! - An Axum extractor and a gate middleware for the admin surface

mod config;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod state;
mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::AdminSession;
pub use handlers::auth_routes;
pub use middleware::admin_gate;
pub use state::AuthState;
pub use token::{decode_token, encode_token};
