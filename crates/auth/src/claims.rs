use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Role, SubjectId, TokenId};

/// Verified token claims (transport-agnostic).
///
/// Produced only by [`crate::TokenVerifier`] after the signature, expiry and
/// revocation checks have passed, or built by the issuing side before signing.
/// Claims are never mutated once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / principal identifier.
    pub subject: SubjectId,

    /// Roles in token order. Duplicates are allowed and carry no meaning.
    pub roles: Vec<Role>,

    /// Unique per issuance; the revocation lookup key.
    pub token_id: TokenId,

    /// Expiration instant (second precision on the wire).
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// A token is expired only once `now` is strictly past its expiration.
    ///
    /// Both instants are compared at whole-second precision, matching the
    /// integer `exp` claim, so a token whose `exp` equals the current second
    /// is still accepted.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.expires_at.timestamp()
    }
}

/// Split the comma-joined `roles` claim.
///
/// Entries are trimmed and empty entries are dropped, so `"ADMIN, ,EMPLOYEE"`
/// yields `[ADMIN, EMPLOYEE]`.
pub(crate) fn parse_roles(raw: &str) -> Vec<Role> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| Role::from(r.to_string()))
        .collect()
}

pub(crate) fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
