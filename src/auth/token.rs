// Bearer token helpers
// Header normalization and unverified inspection of JWT access tokens

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Scheme prefix of the Authorization header
pub const BEARER_PREFIX: &str = "Bearer ";

/// Strip one leading `Bearer ` from a stored token
///
/// Tokens saved by older clients sometimes already carry the scheme.
pub fn normalize_bearer(token: &str) -> &str {
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token)
}

/// Canonical `Bearer <token>` header value
pub fn bearer_header(token: &str) -> String {
    format!("{}{}", BEARER_PREFIX, normalize_bearer(token))
}

/// Registered claims we care about; everything else is ignored
#[derive(Debug, Deserialize)]
struct TimeClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Expiry of a JWT access token, read without verifying the signature
///
/// The client never holds the signing key, so this is informational only:
/// the backend's 401 stays the single source of truth for expiry.
/// Returns `None` for opaque tokens and tokens without `exp`.
pub fn peek_expiry(token: &str) -> Option<DateTime<Utc>> {
    let token = normalize_bearer(token);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let data = decode::<TimeClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims
        .exp
        .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
}

/// True when the token carries an `exp` at or before `now`
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    peek_expiry(token).is_some_and(|exp| exp <= now)
}
