// --- File: crates/tably_common/src/lib.rs ---

pub mod error; // Error taxonomy shared by all crates
pub mod http; // HTTP response mapping and client construction
pub mod kv; // Key-value storage abstraction
pub mod logging; // Logging setup
pub mod services; // Shared service trait plumbing

pub use error::{
    field_error, internal_error, not_found, upstream_error, validation_error, FieldErrors,
    HttpStatusCode, TablyError,
};
pub use http::{client::create_client, IntoHttpResponse, PUBLIC_CACHE_ONE_HOUR};
pub use kv::{KvError, KvStore, MemoryKvStore};
pub use services::BoxFuture;
