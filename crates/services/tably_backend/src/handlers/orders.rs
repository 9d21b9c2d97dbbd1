// --- File: crates/services/tably_backend/src/handlers/orders.rs ---
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tably_common::{field_error, TablyError};
use tracing::info;

use crate::app_state::AppState;
use crate::extract::{AuthClient, ValidatedJson};
use crate::schemas::CreateOrderBody;

/// Places an order for the authenticated client. Any client identity in the
/// body is ignored.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderBody,
    responses(
        (status = 200, description = "Order accepted by the POS"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "POS failure")
    ),
    security(("bearer" = [])),
    tag = "Orders"
))]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    AuthClient(client_id): AuthClient,
    ValidatedJson(body): ValidatedJson<CreateOrderBody>,
) -> Result<Json<Value>, TablyError> {
    let order = body
        .into_new_order()
        .map_err(|e| field_error("serviceMode", e))?;
    let lines = order.products.len();

    let created = state.pos.create_order(order, &client_id).await?;
    info!(client_id = %client_id, lines, "order placed");
    Ok(Json(created))
}
