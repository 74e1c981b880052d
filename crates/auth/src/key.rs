//! Symmetric signing key.
//!
//! The key is an immutable value built once from configuration and handed to
//! the verifier and signer explicitly. It is never generated on the fly: a
//! per-process key would invalidate every outstanding token on restart and
//! would differ between replicas.

use std::sync::Arc;

use thiserror::Error;

/// Minimum accepted key length in bytes (256 bits, the HS256 output size).
pub const MIN_KEY_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing key is {len} bytes; at least {min} bytes are required")]
    TooShort { len: usize, min: usize },
}

/// HMAC key material shared read-only for the process lifetime.
#[derive(Clone)]
pub struct SigningKey(Arc<[u8]>);

impl SigningKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_KEY_LEN {
            return Err(KeyError::TooShort {
                len: bytes.len(),
                min: MIN_KEY_LEN,
            });
        }
        Ok(Self(bytes.into()))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("SigningKey").field(&"<redacted>").finish()
    }
}
