use chrono::{DateTime, Duration, Utc};

use super::{AdminClaims, AuthError, ADMIN_ROLE};

/// Builds the claims for an admin token issued at `now`.
pub fn issue_claims(email: &str, now: DateTime<Utc>, ttl: Duration) -> AdminClaims {
    AdminClaims {
        sub: email.to_string(),
        role: ADMIN_ROLE.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    }
}

/// Check if a token has expired.
pub fn is_token_expired(claims: &AdminClaims, now: DateTime<Utc>) -> bool {
    claims.exp <= now.timestamp()
}

/// Checks role and expiry of already-verified claims.
pub fn validate_claims(claims: &AdminClaims, now: DateTime<Utc>) -> Result<(), AuthError> {
    if claims.role != ADMIN_ROLE {
        return Err(AuthError::NotAdmin);
    }
    if is_token_expired(claims, now) {
        return Err(AuthError::TokenExpired);
    }
    Ok(())
}

/// Compares submitted credentials against the configured pair.
///
/// Both comparisons always run and neither stops at the first differing byte.
pub fn credentials_match(
    expected_email: &str,
    expected_password: &str,
    email: &str,
    password: &str,
) -> bool {
    let email_ok = constant_time_eq(expected_email.as_bytes(), email.as_bytes());
    let password_ok = constant_time_eq(expected_password.as_bytes(), password.as_bytes());
    email_ok & password_ok
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
