use thiserror::Error;

use crate::{Principal, RouteAccess};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: principal holds none of the required roles")]
    InsufficientRole,

    #[error("forbidden: denied by access policy")]
    ResourceDeniedByPolicy,
}

/// Which rule let the request through (for audit logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    OperationRoles,
    OperationUnrestricted,
    ResourceRoles,
}

impl Grant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grant::OperationRoles => "operation_roles",
            Grant::OperationUnrestricted => "operation_unrestricted",
            Grant::ResourceRoles => "resource_roles",
        }
    }
}

/// Resolve a route's declarations against an authenticated principal.
///
/// First matching rule wins:
/// 1. operation `DenyAll` rejects;
/// 2. operation `RequiresAnyOf` allows on a shared role, otherwise falls
///    through (it does not reject on its own);
/// 3. operation `Unrestricted` allows;
/// 4. resource `DenyAll` rejects;
/// 5. resource `RequiresAnyOf` allows on a shared role, otherwise rejects;
/// 6. anything else is denied.
///
/// Pure: no IO, no panics.
pub fn authorize(principal: &Principal, access: &RouteAccess) -> Result<Grant, AuthzError> {
    let operation = &access.operation;
    let resource = &access.resource;

    if operation.denies_all() {
        return Err(AuthzError::ResourceDeniedByPolicy);
    }

    let mut role_check_failed = false;
    if let Some(required) = operation.required_roles() {
        if principal.has_any_role(required) {
            return Ok(Grant::OperationRoles);
        }
        role_check_failed = true;
    }

    if operation.is_unrestricted() {
        return Ok(Grant::OperationUnrestricted);
    }

    if resource.denies_all() {
        return Err(AuthzError::ResourceDeniedByPolicy);
    }

    if let Some(required) = resource.required_roles() {
        return if principal.has_any_role(required) {
            Ok(Grant::ResourceRoles)
        } else {
            Err(AuthzError::InsufficientRole)
        };
    }

    if role_check_failed {
        Err(AuthzError::InsufficientRole)
    } else {
        Err(AuthzError::ResourceDeniedByPolicy)
    }
}
