// --- File: crates/services/tably_backend/src/schemas.rs ---
//! Request and response bodies of the public API.
//!
//! Unknown fields in request bodies are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tably_auth::{phone, SessionRecord};
use tably_pos::models::id_from_string_or_number;
use tably_pos::{Client, NewOrder, OrderModification, OrderProduct, ServiceMode};
use validator::{Validate, ValidationError};

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if phone::is_valid(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("phone");
    err.message = Some("Invalid phone number".into());
    Err(err)
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RequestOtpBody {
    #[cfg_attr(feature = "openapi", schema(example = "4155551234"))]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    /// Used only when a new client has to be created.
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpBody {
    #[cfg_attr(feature = "openapi", schema(example = "+14155551234"))]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    /// Label stored with the session, e.g. the device name.
    #[validate(length(min = 1, message = "Session name is required"))]
    pub session_name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrderLine {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub product_id: String,
    #[validate(range(min = 1, max = 10, message = "Count must be between 1 and 10"))]
    pub count: u32,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    #[serde(default)]
    pub modification: Vec<OrderModification>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    #[validate(length(min = 1, message = "At least one product is required"), nested)]
    pub products: Vec<OrderLine>,
    /// Accepted for compatibility; the order is always placed for the caller.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub client: Option<Value>,
    pub comment: Option<String>,
    #[validate(range(min = 1, max = 3, message = "Service mode must be 1, 2 or 3"))]
    pub service_mode: u8,
}

impl CreateOrderBody {
    /// Drops the body's own `client` and keeps only the order contents.
    pub fn into_new_order(self) -> Result<NewOrder, String> {
        let service_mode = ServiceMode::try_from(self.service_mode)?;
        let products = self
            .products
            .into_iter()
            .map(|line| OrderProduct {
                product_id: line.product_id,
                count: line.count,
                modification: line.modification,
                comment: line.comment,
            })
            .collect();
        Ok(NewOrder {
            products,
            comment: self.comment,
            service_mode,
        })
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VerifyOtpResponse {
    pub token: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub client: Client,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClientResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub client: Client,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionsResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    pub sessions: Vec<SessionRecord>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: &'static str,
}
