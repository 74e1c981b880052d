//! Route-level access-control table.
//!
//! Declarations are attached to routes when they are registered, through
//! [`SecuredRouter`], [`Resource`] and [`Operation`]. The resulting
//! [`AccessTable`] maps `(method, route template)` to the resource-level and
//! operation-level declarations of that route, so the gates only perform a
//! map lookup per request.
//!
//! Every route registered through a `SecuredRouter` has an entry, including
//! routes that declare nothing (those are unprotected). A gated request whose
//! route has no entry is rejected.

use std::collections::HashMap;
use std::sync::Arc;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::MethodRouter;
use axum::Router;

use gatehouse_auth::{AccessPolicy, Declarations, Role, RouteAccess, TokenVerifier};

use crate::config::GateSettings;
use crate::middleware::{self, GateState};

/// Resolved declarations for every registered route.
#[derive(Debug, Clone, Default)]
pub struct AccessTable {
    routes: HashMap<(Method, String), RouteAccess>,
}

impl AccessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    ///
    /// # Panics
    ///
    /// Panics if the `(method, path)` pair is already registered, mirroring
    /// axum's own behaviour for overlapping routes.
    pub fn insert(&mut self, method: Method, path: impl Into<String>, access: RouteAccess) {
        let path = path.into();
        if self.routes.contains_key(&(method.clone(), path.clone())) {
            panic!("access declarations for {method} {path} registered twice");
        }
        self.routes.insert((method, path), access);
    }

    /// Declarations for `method` on the route template `path`.
    ///
    /// `HEAD` is answered by the `GET` handler in axum, so it resolves to the
    /// `GET` entry when it has none of its own.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&RouteAccess> {
        let key = (method.clone(), path.to_string());
        match self.routes.get(&key) {
            Some(access) => Some(access),
            None if method == Method::HEAD => self.routes.get(&(Method::GET, key.1)),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// One endpoint plus its operation-level declarations.
pub struct Operation {
    method: Method,
    path: String,
    policies: Vec<AccessPolicy>,
    route: MethodRouter,
}

macro_rules! operation_constructor {
    ($name:ident, $method:expr) => {
        pub fn $name<H, T>(path: impl Into<String>, handler: H) -> Self
        where
            H: Handler<T, ()>,
            T: 'static,
        {
            Self::with_route($method, path.into(), axum::routing::$name(handler))
        }
    };
}

impl Operation {
    operation_constructor!(get, Method::GET);
    operation_constructor!(post, Method::POST);
    operation_constructor!(put, Method::PUT);
    operation_constructor!(patch, Method::PATCH);
    operation_constructor!(delete, Method::DELETE);

    fn with_route(method: Method, path: String, route: MethodRouter) -> Self {
        Self {
            method,
            path,
            policies: Vec::new(),
            route,
        }
    }

    pub fn policy(mut self, policy: AccessPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn unrestricted(self) -> Self {
        self.policy(AccessPolicy::Unrestricted)
    }

    pub fn deny_all(self) -> Self {
        self.policy(AccessPolicy::DenyAll)
    }

    pub fn requires_any_of<I, R>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        self.policy(AccessPolicy::requires_any_of(roles))
    }
}

/// A group of operations sharing resource-level declarations.
#[derive(Default)]
pub struct Resource {
    policies: Vec<AccessPolicy>,
    operations: Vec<Operation>,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: AccessPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn unrestricted(self) -> Self {
        self.policy(AccessPolicy::Unrestricted)
    }

    pub fn deny_all(self) -> Self {
        self.policy(AccessPolicy::DenyAll)
    }

    pub fn requires_any_of<I, R>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        self.policy(AccessPolicy::requires_any_of(roles))
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }
}

/// Router builder that records access declarations alongside the routes.
pub struct SecuredRouter {
    router: Router,
    table: AccessTable,
}

impl Default for SecuredRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl SecuredRouter {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            table: AccessTable::new(),
        }
    }

    /// Register every operation of `resource`.
    pub fn resource(mut self, resource: Resource) -> Self {
        let resource_decls: Declarations = resource.policies.into_iter().collect();
        for operation in resource.operations {
            self = self.register(operation, resource_decls.clone());
        }
        self
    }

    /// Register an operation that belongs to no resource.
    pub fn route(self, operation: Operation) -> Self {
        self.register(operation, Declarations::none())
    }

    fn register(mut self, operation: Operation, resource: Declarations) -> Self {
        let Operation {
            method,
            path,
            policies,
            route,
        } = operation;

        let access = RouteAccess::new(policies.into_iter().collect(), resource);
        tracing::debug!(
            method = %method,
            path = %path,
            protected = access.is_protected(),
            "registered route"
        );

        self.table.insert(method, path.clone(), access);
        self.router = self.router.route(&path, route);
        self
    }

    pub fn table(&self) -> &AccessTable {
        &self.table
    }

    /// Finish registration and put both gates in front of every route.
    ///
    /// Layers only wrap matched routes, so unknown paths still produce 404
    /// without touching the gates. Merge the result into a larger router
    /// rather than nesting it: nesting changes the matched route template.
    pub fn into_router(self, verifier: Arc<TokenVerifier>, settings: GateSettings) -> Router {
        // axum refuses `route_layer` on a router without routes.
        if self.table.is_empty() {
            return self.router;
        }

        let state = GateState {
            table: Arc::new(self.table),
            verifier,
            settings,
        };

        // Route layers run outermost-last: authentication executes first.
        self.router
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::authorization_gate,
            ))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::authentication_gate,
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok() -> &'static str {
        "ok"
    }

    #[test]
    fn head_resolves_to_get_declarations() {
        let secured = SecuredRouter::new().route(Operation::get("/items", ok).deny_all());
        let table = secured.table();

        let get = table.lookup(&Method::GET, "/items").unwrap();
        assert_eq!(table.lookup(&Method::HEAD, "/items"), Some(get));
        assert_eq!(table.lookup(&Method::POST, "/items"), None);
    }

    #[test]
    fn resource_declarations_apply_to_every_operation() {
        let secured = SecuredRouter::new().resource(
            Resource::new()
                .requires_any_of(["ADMIN"])
                .operation(Operation::get("/admin/users", ok))
                .operation(Operation::delete("/admin/users/:id", ok).deny_all()),
        );
        let table = secured.table();
        assert_eq!(table.len(), 2);

        let list = table.lookup(&Method::GET, "/admin/users").unwrap();
        assert!(list.operation.is_empty());
        assert!(list.resource.required_roles().is_some());

        let delete = table.lookup(&Method::DELETE, "/admin/users/:id").unwrap();
        assert!(delete.operation.denies_all());
        assert!(delete.is_protected());
    }

    #[test]
    fn routes_without_declarations_are_recorded_as_unprotected() {
        let secured = SecuredRouter::new().route(Operation::get("/health", ok));
        let access = secured.table().lookup(&Method::GET, "/health").unwrap();
        assert!(!access.is_protected());
    }

    #[test]
    fn several_methods_can_share_a_path() {
        let secured = SecuredRouter::new()
            .route(Operation::get("/items", ok))
            .route(Operation::post("/items", ok).requires_any_of(["WRITER"]));

        let table = secured.table();
        assert!(!table.lookup(&Method::GET, "/items").unwrap().is_protected());
        assert!(table.lookup(&Method::POST, "/items").unwrap().is_protected());
    }

    #[tokio::test]
    async fn empty_router_finishes_without_gates() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use gatehouse_auth::{InMemoryRevocationRegistry, SigningKey};
        use tower::ServiceExt;

        let key = SigningKey::from_bytes("0123456789abcdef0123456789abcdef").unwrap();
        let verifier = Arc::new(TokenVerifier::new(&key, Arc::new(InMemoryRevocationRegistry::new())));

        let router = SecuredRouter::new().into_router(verifier, GateSettings::default());
        let response = router
            .oneshot(Request::builder().uri("/anything").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let mut table = AccessTable::new();
        table.insert(Method::GET, "/items", RouteAccess::default());
        table.insert(Method::GET, "/items", RouteAccess::default());
    }
}
