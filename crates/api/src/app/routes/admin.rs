//! Administrative endpoints, restricted to `ADMIN` at the resource level.

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};

use crate::access::{Operation, Resource};
use crate::context::SecurityContext;

pub const ADMIN_ROLE: &str = "ADMIN";

pub fn resource() -> Resource {
    Resource::new()
        .requires_any_of([ADMIN_ROLE])
        .operation(Operation::get("/admin/ping", ping))
        .operation(Operation::get("/admin/roles/:role", check_role))
}

/// GET /admin/ping
pub async fn ping(Extension(ctx): Extension<SecurityContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "pong": true,
        "subject": ctx.principal().subject().as_str(),
    }))
}

/// GET /admin/roles/:role - whether the caller holds `role`
pub async fn check_role(
    Extension(ctx): Extension<SecurityContext>,
    Path(role): Path<String>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "role": role,
        "granted": ctx.is_in_role(&role),
    }))
}
