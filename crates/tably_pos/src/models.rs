// --- File: crates/tably_pos/src/models.rs ---
//! Payloads exchanged with the POS API.
//!
//! The POS owns these records, so only the fields this service acts on are
//! typed. Everything else is carried through as raw JSON.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Menu categories as returned by the POS.
pub type Categories = Value;
/// A single product or a product list as returned by the POS.
pub type Product = Value;
/// Free-form field updates forwarded to the POS unchanged.
pub type ClientUpdate = Map<String, Value>;

/// Ids arrive as strings or numbers depending on the POS method.
pub fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or numeric id, got {}",
            other
        ))),
    }
}

/// The POS response envelope: `{"response": T, "error"?: ...}`.
#[derive(Deserialize, Debug)]
pub struct Envelope<T> {
    pub response: Option<T>,
    pub error: Option<Value>,
}

impl<T> Envelope<T> {
    /// `Err(message)` when the POS reported an error, otherwise the payload.
    pub fn into_result(self) -> Result<Option<T>, String> {
        match self.error {
            None | Some(Value::Null) => Ok(self.response),
            Some(Value::String(message)) => Err(message),
            Some(Value::Object(obj)) => Err(obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(obj).to_string())),
            Some(other) => Err(other.to_string()),
        }
    }
}

/// Some lookups answer with a list, others with a single record.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => Some(item),
        }
    }
}

/// A client record owned by the POS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub client_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Client {
    pub fn phone(&self) -> Option<&str> {
        self.fields.get("phone").and_then(Value::as_str)
    }
}

/// Payload for creating a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewClient {
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_groups_id_client: Option<u64>,
}

impl NewClient {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.client_name = name;
        self
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }
}

/// How the order is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ServiceMode {
    Takeaway,
    Delivery,
    DineIn,
}

impl TryFrom<u8> for ServiceMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ServiceMode::Takeaway),
            2 => Ok(ServiceMode::Delivery),
            3 => Ok(ServiceMode::DineIn),
            other => Err(format!("unknown service mode {}", other)),
        }
    }
}

impl From<ServiceMode> for u8 {
    fn from(mode: ServiceMode) -> Self {
        match mode {
            ServiceMode::Takeaway => 1,
            ServiceMode::Delivery => 2,
            ServiceMode::DineIn => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderModification {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub product_id: String,
    pub count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modification: Vec<OrderModification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// An order before it is attributed to a client.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub products: Vec<OrderProduct>,
    pub comment: Option<String>,
    pub service_mode: ServiceMode,
}

impl NewOrder {
    /// Binds the order to `client_id`. No other source of client identity is used.
    pub fn for_client(self, client_id: impl Into<String>) -> OrderRequest {
        OrderRequest {
            client_id: client_id.into(),
            products: self.products,
            comment: self.comment,
            service_mode: self.service_mode,
        }
    }
}

/// The outbound order payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub client_id: String,
    pub products: Vec<OrderProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub service_mode: ServiceMode,
}
