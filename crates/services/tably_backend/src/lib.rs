// --- File: crates/services/tably_backend/src/lib.rs ---
pub mod app_state; // Composition root
pub mod doc;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod schemas;

pub use app_state::{AppState, SharedPos, StartupError};
pub use routes::routes;
