//! Signed token format.
//!
//! Tokens are JWTs in compact serialization (`header.payload.signature`),
//! signed with HMAC-SHA256. Payload claims on the wire:
//!
//! | claim   | type    | meaning                              |
//! |---------|---------|--------------------------------------|
//! | `sub`   | string  | subject id                           |
//! | `roles` | string  | comma-joined role names              |
//! | `jti`   | string  | token id (revocation key)            |
//! | `exp`   | number  | expiration, seconds since Unix epoch |
//!
//! `exp` is written as an integer. On input a fractional value is floored,
//! and values past chrono's range saturate to its bounds.

mod signer;
mod verifier;

pub use signer::{IssuedToken, SigningError, TokenSigner};
pub use verifier::{TokenVerifier, VerificationError};

use chrono::{DateTime, Utc};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Payload as it travels inside the token.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireClaims {
    pub sub: String,
    pub roles: String,
    pub jti: String,
    pub exp: NumericDate,
}

/// JWT NumericDate: integer or fractional seconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumericDate {
    Seconds(i64),
    Fractional(f64),
}

impl NumericDate {
    /// Whole seconds, clamped to the range chrono can represent.
    /// `None` only for NaN.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let min = DateTime::<Utc>::MIN_UTC.timestamp();
        let max = DateTime::<Utc>::MAX_UTC.timestamp();

        let secs = match self {
            NumericDate::Seconds(secs) => secs.clamp(min, max),
            NumericDate::Fractional(f) if f.is_nan() => return None,
            // `as` saturates at the i64 bounds.
            NumericDate::Fractional(f) => (f.floor() as i64).clamp(min, max),
        };
        DateTime::from_timestamp(secs, 0)
    }
}
