//! Declarative access policies.
//!
//! A route carries two independent sets of declarations: one for the resource
//! (the group of operations it belongs to) and one for the operation itself.
//! They are resolved into a decision by [`crate::authorize`].

use std::collections::BTreeSet;

use crate::Role;

/// A single access-control declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any authenticated caller.
    Unrestricted,
    /// Nobody, regardless of roles.
    DenyAll,
    /// Callers holding at least one of the listed roles.
    RequiresAnyOf(BTreeSet<Role>),
}

impl AccessPolicy {
    pub fn requires_any_of<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self::RequiresAnyOf(roles.into_iter().map(Into::into).collect())
    }
}

/// All declarations made at one level (resource or operation).
///
/// Several declarations may coexist on one level; repeated `RequiresAnyOf`
/// declarations are unioned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    deny_all: bool,
    unrestricted: bool,
    required_roles: Option<BTreeSet<Role>>,
}

impl Declarations {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, policy: AccessPolicy) {
        match policy {
            AccessPolicy::Unrestricted => self.unrestricted = true,
            AccessPolicy::DenyAll => self.deny_all = true,
            AccessPolicy::RequiresAnyOf(roles) => {
                self.required_roles.get_or_insert_with(BTreeSet::new).extend(roles);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.deny_all && !self.unrestricted && self.required_roles.is_none()
    }

    pub fn denies_all(&self) -> bool {
        self.deny_all
    }

    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    pub fn required_roles(&self) -> Option<&BTreeSet<Role>> {
        self.required_roles.as_ref()
    }
}

impl FromIterator<AccessPolicy> for Declarations {
    fn from_iter<T: IntoIterator<Item = AccessPolicy>>(iter: T) -> Self {
        let mut declarations = Self::none();
        for policy in iter {
            declarations.declare(policy);
        }
        declarations
    }
}

/// Resolved declarations for one route (method + path template).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAccess {
    pub operation: Declarations,
    pub resource: Declarations,
}

impl RouteAccess {
    pub fn new(operation: Declarations, resource: Declarations) -> Self {
        Self { operation, resource }
    }

    /// A route opts in to protection by declaring anything at either level.
    pub fn is_protected(&self) -> bool {
        !self.operation.is_empty() || !self.resource.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_declarations_means_unprotected() {
        assert!(!RouteAccess::default().is_protected());
    }

    #[test]
    fn any_declaration_at_either_level_protects_the_route() {
        for policy in [
            AccessPolicy::Unrestricted,
            AccessPolicy::DenyAll,
            AccessPolicy::requires_any_of(["ADMIN"]),
        ] {
            let op_level = RouteAccess::new([policy.clone()].into_iter().collect(), Declarations::none());
            let res_level = RouteAccess::new(Declarations::none(), [policy].into_iter().collect());
            assert!(op_level.is_protected());
            assert!(res_level.is_protected());
        }
    }

    #[test]
    fn empty_role_list_still_counts_as_a_declaration() {
        let decl: Declarations = [AccessPolicy::requires_any_of(Vec::<Role>::new())]
            .into_iter()
            .collect();
        assert!(!decl.is_empty());
        assert_eq!(decl.required_roles().map(|r| r.len()), Some(0));
    }

    #[test]
    fn repeated_role_declarations_are_unioned() {
        let decl: Declarations = [
            AccessPolicy::requires_any_of(["A"]),
            AccessPolicy::requires_any_of(["B", "A"]),
        ]
        .into_iter()
        .collect();

        let roles: Vec<&str> = decl.required_roles().unwrap().iter().map(Role::as_str).collect();
        assert_eq!(roles, vec!["A", "B"]);
    }
}
