// --- File: crates/services/tably_backend/src/handlers/clients.rs ---
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use tably_common::{field_error, TablyError};
use tably_pos::{Client, ClientUpdate};
use tracing::warn;

use crate::app_state::AppState;
use crate::extract::AuthClient;

/// Forwards free-form field updates for the caller's own client record.
///
/// The ownership check runs before the body is looked at.
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/clients/{id}",
    params(("id" = String, Path, description = "POS client id")),
    responses(
        (status = 200, description = "Updated client"),
        (status = 400, description = "Missing id or malformed body"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Id does not belong to the caller"),
        (status = 500, description = "POS failure")
    ),
    security(("bearer" = [])),
    tag = "Clients"
))]
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    AuthClient(subject): AuthClient,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Client>, TablyError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(missing_id_error());
    }
    if id != subject {
        warn!(subject = %subject, target = %id, "client update for another subject refused");
        return Err(TablyError::Forbidden);
    }

    let fields: ClientUpdate = serde_json::from_slice(&body)
        .map_err(|e| field_error("body", format!("Expected a JSON object: {}", e)))?;
    let client = state.pos.update_client(id, fields).await?;
    Ok(Json(client))
}

/// `PUT /clients` without an id.
pub async fn missing_id(_: AuthClient) -> TablyError {
    missing_id_error()
}

fn missing_id_error() -> TablyError {
    field_error("id", "Client id is required")
}
