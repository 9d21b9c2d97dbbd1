// --- File: crates/services/tably_backend/src/handlers.rs ---
pub mod auth;
pub mod clients;
pub mod menu;
pub mod orders;

use axum::extract::OriginalUri;
use axum::Json;
use tably_common::{not_found, TablyError};

use crate::schemas::HealthResponse;

pub async fn welcome() -> Json<&'static str> {
    Json("Welcome to the Tably API!")
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Tably"
))]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// JSON 404 for every unmatched route and for known paths hit with the wrong method.
pub async fn fallback(OriginalUri(uri): OriginalUri) -> TablyError {
    not_found(format!("No route for {}", uri.path()))
}
