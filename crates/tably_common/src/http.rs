// --- File: crates/tably_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::error::{HttpStatusCode, TablyError};

pub mod client;

/// `Cache-Control` value for POS-owned data that may be cached by the HTTP layer.
pub const PUBLIC_CACHE_ONE_HOUR: &str = "public, max-age=3600";

/// Extension trait for TablyError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for TablyError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            error!("request failed: {}", self);
        } else {
            warn!("request rejected ({}): {}", status_code.as_u16(), self);
        }

        let body = match &self {
            TablyError::Validation { fields, .. } => json!({
                "message": self.public_message(),
                "errors": fields,
            }),
            _ => json!({ "message": self.public_message() }),
        };

        (status_code, Json(body)).into_response()
    }
}

impl IntoResponse for TablyError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{field_error, upstream_error};
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let response = field_error("phone", "not a valid phone number").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["errors"]["phone"][0], "not a valid phone number");
    }

    #[tokio::test]
    async fn test_upstream_error_is_generic() {
        let response = upstream_error("connection refused to pos.internal:443").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("errors").is_none());
    }
}
