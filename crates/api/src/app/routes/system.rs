use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::SecurityContext;

/// Liveness probe; declares nothing, so it is reachable without a token.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<SecurityContext>) -> impl IntoResponse {
    let principal = ctx.principal();
    Json(serde_json::json!({
        "subject": principal.subject().as_str(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "secure": ctx.is_secure(),
        "scheme": ctx.authentication_scheme(),
    }))
}
