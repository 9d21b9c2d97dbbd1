// --- File: crates/tably_pos/src/lib.rs ---
pub mod client;
pub mod error;
pub mod models;
pub mod service; // Gateway trait implemented by PosClient and test fakes

pub use client::PosClient;
pub use error::PosError;
pub use models::{
    Client, ClientUpdate, NewClient, NewOrder, OrderModification, OrderProduct, OrderRequest,
    ServiceMode,
};
pub use service::PosService;
