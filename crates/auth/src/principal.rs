use std::collections::BTreeSet;

use crate::{Claims, Role, SubjectId};

/// The authenticated caller of one request.
///
/// Derived exactly once from verified [`Claims`]; there are no mutators.
/// Roles are held as a set, so duplicate role entries in a token collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: SubjectId,
    roles: BTreeSet<Role>,
}

impl Principal {
    pub fn new(subject: SubjectId, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            subject,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.contains(name)
    }

    /// "Any of" membership: a single shared role is enough.
    pub fn has_any_role(&self, required: &BTreeSet<Role>) -> bool {
        !self.roles.is_disjoint(required)
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self::new(claims.subject, claims.roles)
    }
}
