//! Admin token signing and verification (HS256).

use chrono::{DateTime, Utc};
use garage_core::auth::{validate_claims, AdminClaims, AuthError as CoreError};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::AuthError;

/// Signs `claims` with `secret`.
pub fn encode_token(claims: &AdminClaims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verifies the signature of `token` and checks its claims at `now`.
pub fn decode_token(token: &str, secret: &str, now: DateTime<Utc>) -> Result<AdminClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<AdminClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => CoreError::TokenExpired,
            _ => CoreError::InvalidToken(e.to_string()),
        })?;

    validate_claims(&data.claims, now)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use garage_core::auth::issue_claims;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trip_preserves_claims() {
        let now = Utc::now();
        let claims = issue_claims("admin@example.com", now, Duration::hours(24));
        let token = encode_token(&claims, SECRET).unwrap();

        let decoded = decode_token(&token, SECRET, now).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let claims = issue_claims("admin@example.com", now, Duration::hours(24));
        let token = encode_token(&claims, SECRET).unwrap();

        assert!(matches!(
            decode_token(&token, "other-secret", now),
            Err(AuthError::Core(CoreError::InvalidToken(_)))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let claims = issue_claims("admin@example.com", now - Duration::days(2), Duration::hours(24));
        let token = encode_token(&claims, SECRET).unwrap();

        assert!(matches!(
            decode_token(&token, SECRET, now),
            Err(AuthError::Core(CoreError::TokenExpired))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_token("not.a.token", SECRET, Utc::now()).is_err());
    }
}
