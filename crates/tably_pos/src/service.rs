// --- File: crates/tably_pos/src/service.rs ---
//! The POS gateway contract.
//!
//! Handlers depend on this trait rather than on [`crate::PosClient`] so they
//! can run against an in-process fake.

use tably_common::BoxFuture;

use crate::models::{Categories, Client, ClientUpdate, NewClient, NewOrder, Product};

pub trait PosService: Send + Sync {
    type Error;

    /// First client registered under `phone`, if any.
    fn find_client_by_phone(&self, phone: &str) -> BoxFuture<'_, Option<Client>, Self::Error>;

    fn create_client(&self, client: NewClient) -> BoxFuture<'_, Client, Self::Error>;

    fn get_client_by_id(&self, client_id: &str) -> BoxFuture<'_, Option<Client>, Self::Error>;

    /// Applies `fields` to the client and returns the updated record.
    fn update_client(
        &self,
        client_id: &str,
        fields: ClientUpdate,
    ) -> BoxFuture<'_, Client, Self::Error>;

    fn send_sms(&self, phone: &str, text: &str) -> BoxFuture<'_, (), Self::Error>;

    fn get_categories(&self) -> BoxFuture<'_, Categories, Self::Error>;

    fn get_products(&self) -> BoxFuture<'_, Product, Self::Error>;

    fn get_product(&self, product_id: &str) -> BoxFuture<'_, Option<Product>, Self::Error>;

    /// Places `order` on behalf of `client_id`.
    fn create_order(
        &self,
        order: NewOrder,
        client_id: &str,
    ) -> BoxFuture<'_, serde_json::Value, Self::Error>;
}
