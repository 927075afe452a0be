mod error;
mod functions;
mod types;

pub use error::AuthError;
pub use functions::{credentials_match, is_token_expired, issue_claims, validate_claims};
pub use types::{AdminClaims, LoginRequest, ADMIN_ROLE};
