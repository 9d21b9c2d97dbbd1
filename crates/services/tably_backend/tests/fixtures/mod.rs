//! In-process POS fake and request helpers shared by the API tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Map, Value};
use tably_backend::{routes, AppState};
use tably_common::BoxFuture;
use tably_config::{AuthConfig, KvConfig};
use tably_pos::models::{Categories, Product};
use tably_pos::{Client, ClientUpdate, NewClient, NewOrder, OrderRequest, PosError, PosService};
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

#[derive(Default)]
pub struct FakePos {
    pub clients: Mutex<Vec<Client>>,
    pub sms: Mutex<Vec<(String, String)>>,
    pub orders: Mutex<Vec<OrderRequest>>,
    pub created: AtomicU64,
    pub fail_sms: AtomicBool,
    pub fail_menu: AtomicBool,
    pub fail_update: AtomicBool,
}

impl FakePos {
    pub fn with_client(client_id: &str, phone: &str) -> Arc<Self> {
        let pos = Self::default();
        pos.insert(client_id, phone);
        Arc::new(pos)
    }

    pub fn insert(&self, client_id: &str, phone: &str) {
        self.clients.lock().unwrap().push(client(client_id, phone));
    }

    fn menu_result<T>(&self, value: T) -> Result<T, PosError> {
        if self.fail_menu.load(Ordering::SeqCst) {
            Err(PosError::Status {
                status: 503,
                body: "menu unavailable".into(),
            })
        } else {
            Ok(value)
        }
    }

    /// Digits of the most recent SMS sent to `phone`.
    pub fn last_code(&self, phone: &str) -> Option<String> {
        self.sms
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == phone)
            .map(|(_, text)| text.chars().filter(char::is_ascii_digit).collect())
    }
}

pub fn client(client_id: &str, phone: &str) -> Client {
    let mut fields = Map::new();
    fields.insert("phone".into(), json!(phone));
    Client {
        client_id: client_id.to_string(),
        fields,
    }
}

impl PosService for FakePos {
    type Error = PosError;

    fn find_client_by_phone(&self, phone: &str) -> BoxFuture<'_, Option<Client>, PosError> {
        let found = self
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.phone() == Some(phone))
            .cloned();
        Box::pin(async move { Ok(found) })
    }

    fn create_client(&self, new_client: NewClient) -> BoxFuture<'_, Client, PosError> {
        let id = 100 + self.created.fetch_add(1, Ordering::SeqCst);
        let mut created = client(&id.to_string(), &new_client.phone);
        if let Some(name) = new_client.client_name {
            created.fields.insert("client_name".into(), json!(name));
        }
        self.clients.lock().unwrap().push(created.clone());
        Box::pin(async move { Ok(created) })
    }

    fn get_client_by_id(&self, client_id: &str) -> BoxFuture<'_, Option<Client>, PosError> {
        let found = self
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.client_id == client_id)
            .cloned();
        Box::pin(async move { Ok(found) })
    }

    fn update_client(
        &self,
        client_id: &str,
        fields: ClientUpdate,
    ) -> BoxFuture<'_, Client, PosError> {
        let mut clients = self.clients.lock().unwrap();
        let result = match clients.iter_mut().find(|c| c.client_id == client_id) {
            Some(_) if self.fail_update.load(Ordering::SeqCst) => Err(PosError::Api {
                method: "clients.updateClient".into(),
                message: "update rejected".into(),
            }),
            Some(existing) => {
                existing.fields.extend(fields);
                Ok(existing.clone())
            }
            None => Err(PosError::MissingResponse("clients.updateClient".into())),
        };
        Box::pin(async move { result })
    }

    fn send_sms(&self, phone: &str, text: &str) -> BoxFuture<'_, (), PosError> {
        self.sms
            .lock()
            .unwrap()
            .push((phone.to_string(), text.to_string()));
        let result = if self.fail_sms.load(Ordering::SeqCst) {
            Err(PosError::Api {
                method: "marketing.sendSms".into(),
                message: "gateway down".into(),
            })
        } else {
            Ok(())
        };
        Box::pin(async move { result })
    }

    fn get_categories(&self) -> BoxFuture<'_, Categories, PosError> {
        let result = self.menu_result(json!([{"category_id": "1", "category_name": "Pizza"}]));
        Box::pin(async move { result })
    }

    fn get_products(&self) -> BoxFuture<'_, Product, PosError> {
        let result = self.menu_result(json!([{"product_id": "15", "product_name": "Margherita"}]));
        Box::pin(async move { result })
    }

    fn get_product(&self, product_id: &str) -> BoxFuture<'_, Option<Product>, PosError> {
        let result = self.menu_result((product_id == "15").then(|| json!({"product_id": "15"})));
        Box::pin(async move { result })
    }

    fn create_order(&self, order: NewOrder, client_id: &str) -> BoxFuture<'_, Value, PosError> {
        let request = order.for_client(client_id);
        let response = json!({"incoming_order_id": 1, "client_id": request.client_id});
        self.orders.lock().unwrap().push(request);
        Box::pin(async move { Ok(response) })
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.to_string(),
        cookie_name: "session".to_string(),
        otp_length: 6,
        otp_ttl_seconds: 300,
        sms_template: "Your verification code: {code}".to_string(),
        token_ttl_seconds: None,
        otp_single_use: false,
        rollback_otp_on_sms_failure: false,
    }
}

pub fn app_with(auth: AuthConfig, pos: Arc<FakePos>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(&auth, &KvConfig::default(), pos));
    (routes(state.clone()), state)
}

pub fn app(pos: Arc<FakePos>) -> (Router, Arc<AppState>) {
    app_with(auth_config(), pos)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}
