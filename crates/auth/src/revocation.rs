//! Revocation registry contract.
//!
//! The registry is owned by the issuance side of the system; the gateway only
//! reads it. A token id with no record is treated as not revoked.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::TokenId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RevocationError {
    /// The backing store could not answer. Callers must fail closed.
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of tokens invalidated ahead of their natural expiry.
///
/// Implementations must not cache negative answers: a revocation has to take
/// effect on the very next request.
#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationError>;
}

#[async_trait]
impl<R> RevocationRegistry for Arc<R>
where
    R: RevocationRegistry + ?Sized,
{
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationError> {
        (**self).is_revoked(token_id).await
    }
}

/// In-memory denylist for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRevocationRegistry {
    revoked: RwLock<HashSet<TokenId>>,
}

impl InMemoryRevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a token as revoked. Returns `false` if it already was.
    pub fn revoke(&self, token_id: TokenId) -> bool {
        let mut revoked = self.revoked.write().unwrap_or_else(|p| p.into_inner());
        revoked.insert(token_id)
    }

    /// Drop a revocation record. Returns `false` if there was none.
    pub fn reinstate(&self, token_id: &TokenId) -> bool {
        let mut revoked = self.revoked.write().unwrap_or_else(|p| p.into_inner());
        revoked.remove(token_id)
    }
}

#[async_trait]
impl RevocationRegistry for InMemoryRevocationRegistry {
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationError> {
        // Single insert/remove per write: the set is consistent even after a
        // writer panicked, so poisoning is ignored as it is in `revoke`.
        let revoked = self.revoked.read().unwrap_or_else(|p| p.into_inner());
        Ok(revoked.contains(token_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(s: &str) -> TokenId {
        TokenId::new(s).unwrap()
    }

    #[tokio::test]
    async fn unknown_tokens_are_not_revoked() {
        let registry = InMemoryRevocationRegistry::new();
        assert_eq!(registry.is_revoked(&tid("t1")).await, Ok(false));
    }

    #[tokio::test]
    async fn revocation_takes_effect_immediately_and_can_be_undone() {
        let registry = Arc::new(InMemoryRevocationRegistry::new());

        assert!(registry.revoke(tid("t1")));
        assert!(!registry.revoke(tid("t1")));
        assert_eq!(registry.is_revoked(&tid("t1")).await, Ok(true));
        assert_eq!(registry.is_revoked(&tid("t2")).await, Ok(false));

        assert!(registry.reinstate(&tid("t1")));
        assert_eq!(registry.is_revoked(&tid("t1")).await, Ok(false));
    }

    #[tokio::test]
    async fn poisoned_lock_keeps_answering_reads_and_writes() {
        let registry = Arc::new(InMemoryRevocationRegistry::new());
        registry.revoke(tid("t1"));

        let poisoner = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.revoked.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(registry.revoked.is_poisoned());

        assert_eq!(registry.is_revoked(&tid("t1")).await, Ok(true));
        assert!(registry.revoke(tid("t2")));
        assert_eq!(registry.is_revoked(&tid("t2")).await, Ok(true));
    }
}
