//! Durable storage for Tably.
//!
//! [`SqlKvStore`] implements the shared [`tably_common::KvStore`] trait on a
//! single SQL table, so OTP codes and session lists survive restarts and are
//! visible to every instance using the same database. SQLite is the default
//! driver; Postgres is available behind the `postgres` feature.

pub mod client;
pub mod error;
pub mod kv;

pub use client::DbClient;
pub use error::DbError;
pub use kv::SqlKvStore;
