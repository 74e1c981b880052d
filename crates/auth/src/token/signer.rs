use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header};
use thiserror::Error;

use crate::claims::join_roles;
use crate::{Claims, Role, SigningKey, SubjectId, TokenId};

use super::{NumericDate, WireClaims, TOKEN_ALGORITHM};

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),

    /// The role would not survive the comma-joined `roles` claim unchanged.
    #[error("role {0:?} cannot be carried in a token (empty, untrimmed or contains ',')")]
    InvalidRole(String),
}

/// A freshly minted token together with the facts the issuer must record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: TokenId,
    pub expires_at: DateTime<Utc>,
}

/// Mints tokens with the same [`SigningKey`] the verifier uses.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    header: Header,
}

impl TokenSigner {
    pub fn new(key: &SigningKey) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            header: Header::new(TOKEN_ALGORITHM),
        }
    }

    /// Sign explicit claims. Sub-second precision of `expires_at` is dropped.
    ///
    /// Every role must read back as itself after the verifier splits and
    /// trims the claim; anything else is [`SigningError::InvalidRole`].
    pub fn sign(&self, claims: &Claims) -> Result<String, SigningError> {
        if let Some(role) = claims.roles.iter().find(|r| !is_encodable(r)) {
            return Err(SigningError::InvalidRole(role.as_str().to_string()));
        }

        let wire = WireClaims {
            sub: claims.subject.as_str().to_string(),
            roles: join_roles(&claims.roles),
            jti: claims.token_id.as_str().to_string(),
            exp: NumericDate::Seconds(claims.expires_at.timestamp()),
        };
        Ok(jsonwebtoken::encode(&self.header, &wire, &self.encoding_key)?)
    }

    /// Issue a new token valid for `ttl` from `now`, with a fresh token id.
    pub fn issue(
        &self,
        subject: SubjectId,
        roles: Vec<Role>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, SigningError> {
        let claims = Claims {
            subject,
            roles,
            token_id: TokenId::generate(),
            expires_at: now + ttl,
        };
        let token = self.sign(&claims)?;

        tracing::debug!(
            subject = %claims.subject,
            token_id = %claims.token_id,
            expires_at = %claims.expires_at,
            "issued token"
        );

        Ok(IssuedToken {
            token,
            token_id: claims.token_id,
            expires_at: claims.expires_at,
        })
    }
}

fn is_encodable(role: &Role) -> bool {
    let name = role.as_str();
    !name.is_empty() && !name.contains(',') && name.trim() == name
}

impl core::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &self.header.alg)
            .finish_non_exhaustive()
    }
}
