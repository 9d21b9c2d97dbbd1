// --- File: crates/services/tably_backend/src/handlers/menu.rs ---
//! Pass-through menu reads. Caching is left to HTTP clients through the
//! `Cache-Control` header set on these routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;
use tably_common::{field_error, not_found, TablyError};

use crate::app_state::AppState;

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/menu/categories",
    responses(
        (status = 200, description = "Menu categories from the POS"),
        (status = 500, description = "POS failure")
    ),
    tag = "Menu"
))]
pub async fn categories(State(state): State<Arc<AppState>>) -> Result<Json<Value>, TablyError> {
    Ok(Json(state.pos.get_categories().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/menu/products",
    responses(
        (status = 200, description = "Products from the POS"),
        (status = 500, description = "POS failure")
    ),
    tag = "Menu"
))]
pub async fn products(State(state): State<Arc<AppState>>) -> Result<Json<Value>, TablyError> {
    Ok(Json(state.pos.get_products().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/menu/products/{id}",
    params(("id" = String, Path, description = "POS product id")),
    responses(
        (status = 200, description = "A single product"),
        (status = 404, description = "Unknown product"),
        (status = 500, description = "POS failure")
    ),
    tag = "Menu"
))]
pub async fn product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, TablyError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(missing_id());
    }
    state
        .pos
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Product not found"))
}

/// `GET /menu/products/` with an empty id.
pub async fn missing_product_id() -> TablyError {
    missing_id()
}

fn missing_id() -> TablyError {
    field_error("id", "Product id is required")
}
