use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use gatehouse_auth::{AuthzError, VerificationError};

/// Why a gate refused a request.
///
/// The detail is for logs only. The response body carries nothing but the
/// status: every verification and authorization failure looks identical to
/// the caller.
#[derive(Debug, Error)]
pub enum GateRejection {
    #[error("no token presented")]
    MissingToken,

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Authorization(#[from] AuthzError),

    /// A gated request whose route has no entry in the access table, or a
    /// protected request that reached authorization without an identity.
    #[error("gate misconfigured: {0}")]
    Misconfigured(String),
}

impl GateRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            GateRejection::MissingToken => StatusCode::UNAUTHORIZED,
            GateRejection::Verification(_)
            | GateRejection::Authorization(_)
            | GateRejection::Misconfigured(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self.status() {
            StatusCode::UNAUTHORIZED => json_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
            _ => json_error(StatusCode::FORBIDDEN, "Forbidden"),
        }
    }
}

/// `{"status": <code>, "message": <text>}` with the matching HTTP status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "status": status.as_u16(),
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(rejection: GateRejection) -> (StatusCode, serde_json::Value) {
        let response = rejection.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_token_is_401() {
        let (status, body) = body_of(GateRejection::MissingToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "status": 401, "message": "Unauthorized" }));
    }

    #[tokio::test]
    async fn every_other_rejection_has_the_same_403_body() {
        let rejections = vec![
            GateRejection::Verification(VerificationError::Malformed),
            GateRejection::Verification(VerificationError::InvalidSignature),
            GateRejection::Verification(VerificationError::Expired),
            GateRejection::Verification(VerificationError::Revoked),
            GateRejection::Authorization(AuthzError::InsufficientRole),
            GateRejection::Authorization(AuthzError::ResourceDeniedByPolicy),
            GateRejection::Misconfigured("GET /x".to_string()),
        ];

        for rejection in rejections {
            let (status, body) = body_of(rejection).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body, json!({ "status": 403, "message": "Forbidden" }));
        }
    }
}
