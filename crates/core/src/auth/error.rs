use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("admin authentication is not configured: {0} is unset")]
    NotConfigured(&'static str),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid admin token: {0}")]
    InvalidToken(String),

    #[error("admin token expired")]
    TokenExpired,

    #[error("token does not carry the admin role")]
    NotAdmin,
}
