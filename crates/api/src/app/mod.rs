//! HTTP API application wiring (Axum router + gate wiring).
//!
//! - `routes/`: HTTP routes + handlers, registered with their access declarations
//! - `errors.rs`: gate rejections and the JSON error body

use std::sync::Arc;

use axum::Router;

use gatehouse_auth::{RevocationRegistry, TokenVerifier};

use crate::config::GatewayConfig;

pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The verifier is built here, once, from the configured key; every request
/// shares it.
pub fn build_app(config: &GatewayConfig, registry: Arc<dyn RevocationRegistry>) -> Router {
    let verifier = Arc::new(TokenVerifier::new(&config.signing_key, registry));

    let secured = routes::router().into_router(verifier, config.gate.clone());

    Router::new().merge(secured)
}
