// --- File: crates/tably_common/src/services.rs ---
//! Shared pieces for the async service traits of the workspace.
//!
//! Service traits return boxed futures so they stay object safe and can be
//! held as `Arc<dyn Trait>` in application state.

use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;
