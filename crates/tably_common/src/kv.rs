//! Key-value storage used for OTP codes and session lists.
//!
//! The [`KvStore`] trait only promises per-key atomicity of single
//! operations. Read-modify-write sequences built on top of it are not atomic.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

use crate::error::TablyError;
use crate::services::BoxFuture;

/// Errors raised by a key-value backend.
#[derive(Error, Debug)]
pub enum KvError {
    #[error("KV backend error: {0}")]
    Backend(String),
}

impl From<KvError> for TablyError {
    fn from(err: KvError) -> Self {
        TablyError::Storage(err.to_string())
    }
}

/// A key-value store with optional per-key expiry.
pub trait KvStore: Send + Sync {
    /// Returns the value for `key`, or `None` if it is missing or expired.
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, KvError>;

    /// Writes `value` under `key`, replacing any previous value and its expiry.
    fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> BoxFuture<'_, (), KvError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, (), KvError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Minimum time between two sweeps of expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Entries {
    map: HashMap<String, Entry>,
    next_sweep: Instant,
}

impl Entries {
    /// Drops every expired entry once per [`SWEEP_INTERVAL`].
    fn sweep(&mut self, now: Instant, namespace: &str) {
        if now < self.next_sweep {
            return;
        }
        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired(now));
        self.next_sweep = now + SWEEP_INTERVAL;
        let purged = before - self.map.len();
        if purged > 0 {
            trace!(namespace, purged, "swept expired keys");
        }
    }
}

/// In-process [`KvStore`]. Expired entries are invisible to `get`; they are
/// dropped when read and swept on writes, so abandoned keys do not pile up.
#[derive(Debug)]
pub struct MemoryKvStore {
    namespace: String,
    entries: RwLock<Entries>,
}

impl MemoryKvStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                next_sweep: Instant::now() + SWEEP_INTERVAL,
            }),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn stored_entries(&self) -> usize {
        self.entries.read().await.map.len()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, KvError> {
        let key = key.to_string();
        Box::pin(async move {
            let now = Instant::now();
            {
                let entries = self.entries.read().await;
                match entries.map.get(&key) {
                    None => return Ok(None),
                    Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                    Some(_) => {}
                }
            }

            let mut entries = self.entries.write().await;
            if entries.map.get(&key).is_some_and(|entry| entry.is_expired(now)) {
                trace!(namespace = %self.namespace, "purging expired key");
                entries.map.remove(&key);
            }
            Ok(None)
        })
    }

    fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> BoxFuture<'_, (), KvError> {
        let key = key.to_string();
        Box::pin(async move {
            let now = Instant::now();
            let expires_at = ttl.map(|ttl| now + ttl);
            let mut entries = self.entries.write().await;
            entries.sweep(now, &self.namespace);
            entries.map.insert(key, Entry { value, expires_at });
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, (), KvError> {
        let key = key.to_string();
        Box::pin(async move {
            self.entries.write().await.map.remove(&key);
            Ok(())
        })
    }
}
