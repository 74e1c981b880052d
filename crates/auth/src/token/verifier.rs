use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{errors::ErrorKind, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::parse_roles;
use crate::{Claims, RevocationError, RevocationRegistry, SigningKey, SubjectId, TokenId};

use super::{WireClaims, TOKEN_ALGORITHM};

/// Why a presented token was refused.
///
/// The variants exist for logging and tests only; the HTTP layer collapses
/// all of them into a single response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token has been revoked")]
    Revoked,

    #[error("revocation status could not be determined: {0}")]
    RevocationCheckFailed(#[from] RevocationError),
}

impl VerificationError {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationError::Malformed => "malformed",
            VerificationError::InvalidSignature => "invalid_signature",
            VerificationError::Expired => "expired",
            VerificationError::Revoked => "revoked",
            VerificationError::RevocationCheckFailed(_) => "revocation_check_failed",
        }
    }
}

/// Verifies signature, expiry and revocation status of presented tokens.
///
/// Built once at startup and shared (`Arc`) across requests; holds no
/// mutable state.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    registry: Arc<dyn RevocationRegistry>,
}

impl TokenVerifier {
    pub fn new(key: &SigningKey, registry: Arc<dyn RevocationRegistry>) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked against the caller-supplied clock in `decode`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
            registry,
        }
    }

    /// Full verification: structure, signature, expiry, then revocation.
    ///
    /// The registry is consulted on every call, after the cheaper local
    /// checks have passed. A registry failure is reported as
    /// [`VerificationError::RevocationCheckFailed`] and must be treated as a
    /// rejection.
    pub async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, VerificationError> {
        let claims = self.decode(token, now)?;

        if self.registry.is_revoked(&claims.token_id).await? {
            return Err(VerificationError::Revoked);
        }

        Ok(claims)
    }

    /// Local checks only (no revocation lookup).
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, VerificationError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => VerificationError::InvalidSignature,
                _ => VerificationError::Malformed,
            })?;

        let claims = into_claims(data.claims)?;
        if claims.is_expired_at(now) {
            return Err(VerificationError::Expired);
        }

        Ok(claims)
    }
}

impl core::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish_non_exhaustive()
    }
}

fn into_claims(wire: WireClaims) -> Result<Claims, VerificationError> {
    let subject = SubjectId::new(wire.sub).map_err(|_| VerificationError::Malformed)?;
    let token_id = TokenId::new(wire.jti).map_err(|_| VerificationError::Malformed)?;
    let expires_at = wire.exp.to_datetime().ok_or(VerificationError::Malformed)?;

    Ok(Claims {
        subject,
        roles: parse_roles(&wire.roles),
        token_id,
        expires_at,
    })
}
