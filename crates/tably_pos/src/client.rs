// --- File: crates/tably_pos/src/client.rs ---
//! HTTP implementation of [`PosService`].
//!
//! Every method is called as `{api_url}/{method}?token=...`. Reads use GET
//! with query parameters, writes POST a JSON body.

use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tably_common::{create_client, BoxFuture};
use tably_config::PosConfig;
use tracing::{debug, error, info};

use crate::error::PosError;
use crate::models::{
    Categories, Client, ClientUpdate, Envelope, NewClient, NewOrder, OneOrMany, Product,
};
use crate::service::PosService;

const FIND_CLIENTS: &str = "clients.getClients";
const GET_CLIENT: &str = "clients.getClient";
const CREATE_CLIENT: &str = "clients.createClient";
const UPDATE_CLIENT: &str = "clients.updateClient";
const GET_CATEGORIES: &str = "menu.getCategories";
const GET_PRODUCTS: &str = "menu.getProducts";
const GET_PRODUCT: &str = "menu.getProduct";
const CREATE_ORDER: &str = "incomingOrders.createIncomingOrder";

pub struct PosClient {
    http: HttpClient,
    base_url: String,
    access_token: String,
    client_group_id: Option<u64>,
    sms_method: String,
}

impl PosClient {
    pub fn new(config: &PosConfig) -> Result<Self, PosError> {
        let http = create_client(config.timeout_secs, true)?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            client_group_id: config.client_group_id,
            sms_method: config.sms_method.clone(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, PosError> {
        debug!(method, "POS GET");
        let response = self
            .http
            .get(self.url(method))
            .query(&[("token", self.access_token.as_str())])
            .query(query)
            .send()
            .await?;
        decode(method, response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<Option<T>, PosError> {
        debug!(method, "POS POST");
        let response = self
            .http
            .post(self.url(method))
            .query(&[("token", self.access_token.as_str())])
            .json(body)
            .send()
            .await?;
        decode(method, response).await
    }

    async fn fetch_client(&self, client_id: &str) -> Result<Option<Client>, PosError> {
        let found: Option<OneOrMany<Client>> =
            self.get(GET_CLIENT, &[("client_id", client_id)]).await?;
        Ok(found.and_then(OneOrMany::into_first))
    }
}

async fn decode<T: DeserializeOwned>(method: &str, response: Response) -> Result<Option<T>, PosError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        error!(method, %status, "POS returned a non-success status");
        return Err(PosError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    envelope.into_result().map_err(|message| {
        error!(method, %message, "POS reported an error");
        PosError::Api {
            method: method.to_string(),
            message,
        }
    })
}

fn required<T>(method: &str, value: Option<T>) -> Result<T, PosError> {
    value.ok_or_else(|| PosError::MissingResponse(method.to_string()))
}

/// Treats `null`, `false` and `0` as "not done".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

impl PosService for PosClient {
    type Error = PosError;

    fn find_client_by_phone(&self, phone: &str) -> BoxFuture<'_, Option<Client>, PosError> {
        let phone = phone.to_string();
        Box::pin(async move {
            let found: Option<OneOrMany<Client>> =
                self.get(FIND_CLIENTS, &[("phone", phone.as_str())]).await?;
            Ok(found.and_then(OneOrMany::into_first))
        })
    }

    fn create_client(&self, client: NewClient) -> BoxFuture<'_, Client, PosError> {
        Box::pin(async move {
            let mut client = client;
            if client.client_groups_id_client.is_none() {
                client.client_groups_id_client = self.client_group_id;
            }

            let created: Option<Value> = self.post(CREATE_CLIENT, &client).await?;
            let id = match required(CREATE_CLIENT, created)? {
                Value::String(id) if !id.is_empty() => id,
                Value::Number(id) => id.to_string(),
                other => {
                    return Err(PosError::Api {
                        method: CREATE_CLIENT.to_string(),
                        message: format!("unexpected client id {}", other),
                    })
                }
            };
            info!(client_id = %id, "POS client created");

            required(CREATE_CLIENT, self.fetch_client(&id).await?)
        })
    }

    fn get_client_by_id(&self, client_id: &str) -> BoxFuture<'_, Option<Client>, PosError> {
        let client_id = client_id.to_string();
        Box::pin(async move { self.fetch_client(&client_id).await })
    }

    fn update_client(
        &self,
        client_id: &str,
        fields: ClientUpdate,
    ) -> BoxFuture<'_, Client, PosError> {
        let client_id = client_id.to_string();
        Box::pin(async move {
            let mut body = fields;
            body.insert("client_id".to_string(), Value::String(client_id.clone()));

            let updated: Option<Value> = self.post(UPDATE_CLIENT, &body).await?;
            if !updated.as_ref().is_some_and(is_truthy) {
                return Err(PosError::MissingResponse(UPDATE_CLIENT.to_string()));
            }
            info!(client_id = %client_id, "POS client updated");

            required(UPDATE_CLIENT, self.fetch_client(&client_id).await?)
        })
    }

    fn send_sms(&self, phone: &str, text: &str) -> BoxFuture<'_, (), PosError> {
        let body = json!({ "phone": phone, "message": text });
        Box::pin(async move {
            let sent: Option<Value> = self.post(&self.sms_method, &body).await?;
            if !sent.as_ref().is_some_and(is_truthy) {
                return Err(PosError::MissingResponse(self.sms_method.clone()));
            }
            Ok(())
        })
    }

    fn get_categories(&self) -> BoxFuture<'_, Categories, PosError> {
        Box::pin(async move {
            let categories = self.get::<Categories>(GET_CATEGORIES, &[]).await?;
            required(GET_CATEGORIES, categories)
        })
    }

    fn get_products(&self) -> BoxFuture<'_, Product, PosError> {
        Box::pin(async move {
            let products = self.get::<Product>(GET_PRODUCTS, &[]).await?;
            required(GET_PRODUCTS, products)
        })
    }

    fn get_product(&self, product_id: &str) -> BoxFuture<'_, Option<Product>, PosError> {
        let product_id = product_id.to_string();
        Box::pin(async move {
            self.get::<Product>(GET_PRODUCT, &[("product_id", product_id.as_str())])
                .await
        })
    }

    fn create_order(&self, order: NewOrder, client_id: &str) -> BoxFuture<'_, Value, PosError> {
        let request = order.for_client(client_id);
        Box::pin(async move {
            let created: Option<Value> = self.post(CREATE_ORDER, &request).await?;
            let created = required(CREATE_ORDER, created)?;
            info!(client_id = %request.client_id, "POS order created");
            Ok(created)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!({"ok": 1})));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let config = PosConfig {
            api_url: "https://pos.example.com/api/".to_string(),
            access_token: "tok".to_string(),
            timeout_secs: 5,
            client_group_id: None,
            sms_method: "marketing.sendSms".to_string(),
        };
        let client = PosClient::new(&config).unwrap();
        assert_eq!(
            client.url(GET_CATEGORIES),
            "https://pos.example.com/api/menu.getCategories"
        );
    }
}
