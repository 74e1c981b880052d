//! Request gates.
//!
//! Two axum middlewares installed by [`crate::access::SecuredRouter`]:
//!
//! 1. [`authentication_gate`] decides whether the route is protected, reads
//!    the token header, verifies the token and attaches a [`SecurityContext`];
//! 2. [`authorization_gate`] resolves the route's declarations against that
//!    context.
//!
//! Outcomes per request: unprotected routes pass untouched; a protected
//! route without a token gets 401; any verification or authorization failure
//! gets 403.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderName, Method},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use gatehouse_auth::{authorize, Principal, RouteAccess, TokenVerifier, VerificationError};

use crate::access::AccessTable;
use crate::app::errors::GateRejection;
use crate::config::GateSettings;
use crate::context::{transport_is_secure, SecurityContext};

#[derive(Clone)]
pub struct GateState {
    pub table: Arc<AccessTable>,
    pub verifier: Arc<TokenVerifier>,
    pub settings: GateSettings,
}

pub async fn authentication_gate(
    State(state): State<GateState>,
    mut req: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let (method, path) = route_of(&req);
    let access = resolve(&state.table, &method, &path)?;

    if !access.is_protected() {
        return Ok(next.run(req).await);
    }

    let token = match extract_token(req.headers(), &state.settings.token_header) {
        Ok(token) => token,
        Err(rejection) => {
            tracing::info!(%method, path = %path, reason = %rejection, "token header unusable for protected route");
            return Err(rejection);
        }
    };

    let claims = match state.verifier.verify(&token, Utc::now()).await {
        Ok(claims) => claims,
        Err(e) => {
            match &e {
                VerificationError::RevocationCheckFailed(cause) => {
                    tracing::error!(%method, path = %path, error = %cause, "revocation check failed; rejecting")
                }
                other => tracing::warn!(%method, path = %path, kind = other.kind(), "token rejected"),
            }
            return Err(e.into());
        }
    };

    let secure = transport_is_secure(
        req.uri(),
        req.headers(),
        state.settings.trust_forwarded_proto,
    );
    let principal = Principal::from(claims);
    tracing::debug!(%method, path = %path, subject = %principal.subject(), "token verified");

    req.extensions_mut()
        .insert(SecurityContext::new(principal, secure));

    Ok(next.run(req).await)
}

pub async fn authorization_gate(
    State(state): State<GateState>,
    req: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let (method, path) = route_of(&req);
    let access = resolve(&state.table, &method, &path)?;

    if !access.is_protected() {
        return Ok(next.run(req).await);
    }

    let Some(ctx) = req.extensions().get::<SecurityContext>() else {
        tracing::error!(%method, path = %path, "protected route reached authorization without identity");
        return Err(GateRejection::Misconfigured(format!(
            "{method} {path} has no security context"
        )));
    };

    match authorize(ctx.principal(), access) {
        Ok(grant) => {
            tracing::debug!(
                %method,
                path = %path,
                subject = %ctx.principal().subject(),
                rule = grant.as_str(),
                "request authorized"
            );
        }
        Err(e) => {
            tracing::warn!(
                %method,
                path = %path,
                subject = %ctx.principal().subject(),
                reason = %e,
                "request denied"
            );
            return Err(e.into());
        }
    }

    Ok(next.run(req).await)
}

fn route_of(req: &Request) -> (Method, String) {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    (req.method().clone(), path)
}

/// Gated requests must map to a table entry; anything else fails closed.
fn resolve<'a>(table: &'a AccessTable, method: &Method, path: &str) -> Result<&'a RouteAccess, GateRejection> {
    table.lookup(method, path).ok_or_else(|| {
        tracing::error!(%method, path, "gated route missing from access table");
        GateRejection::Misconfigured(format!("{method} {path} is not in the access table"))
    })
}

/// An absent, empty or blank header counts as "no token"; a header that is
/// present but not valid text is a malformed token.
fn extract_token(headers: &HeaderMap, name: &HeaderName) -> Result<String, GateRejection> {
    let value = headers.get(name).ok_or(GateRejection::MissingToken)?;
    let value = value
        .to_str()
        .map_err(|_| GateRejection::Verification(VerificationError::Malformed))?;

    let token = value.trim();
    if token.is_empty() {
        return Err(GateRejection::MissingToken);
    }

    Ok(token.to_string())
}
