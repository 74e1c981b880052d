use std::sync::Arc;

use axum::http::{uri::Scheme, HeaderMap, Uri};

use gatehouse_auth::Principal;

/// Authentication scheme reported to handlers.
pub const TOKEN_AUTH_SCHEME: &str = "Token";

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Security context for a request (authenticated principal + transport).
///
/// Attached by the authentication gate to protected requests only; handlers
/// of unprotected routes will not find one. Immutable once attached.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    principal: Arc<Principal>,
    secure: bool,
}

impl SecurityContext {
    pub fn new(principal: Principal, secure: bool) -> Self {
        Self {
            principal: Arc::new(principal),
            secure,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.principal.has_role(role)
    }

    /// Whether the request arrived over an encrypted transport.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn authentication_scheme(&self) -> &'static str {
        TOKEN_AUTH_SCHEME
    }
}

/// `https` in the request URI, or (only when the proxy is trusted) in the
/// first `X-Forwarded-Proto` entry.
pub(crate) fn transport_is_secure(uri: &Uri, headers: &HeaderMap, trust_forwarded_proto: bool) -> bool {
    if uri.scheme() == Some(&Scheme::HTTPS) {
        return true;
    }
    if !trust_forwarded_proto {
        return false;
    }

    headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}
