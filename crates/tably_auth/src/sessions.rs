//! Append-only list of issued sessions per client.
//!
//! The list is informational only and never consulted for authorization.
//! `append` is a read-then-write over the store and is not atomic: two
//! concurrent logins of the same client can lose one record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tably_common::KvStore;
use tracing::debug;

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub token: String,
    /// Device or session label chosen by the client.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(token: String, name: String) -> Self {
        Self {
            token,
            name,
            created_at: Utc::now(),
        }
    }
}

pub fn session_key(client_id: &str) -> String {
    format!("sessions:{}", client_id)
}

pub struct SessionRegistry {
    store: Arc<dyn KvStore>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, client_id: &str, record: SessionRecord) -> Result<(), AuthError> {
        let key = session_key(client_id);
        let mut sessions = self.list(client_id).await?;
        sessions.push(record);

        let json = serde_json::to_string(&sessions)?;
        self.store.put(&key, json, None).await?;
        debug!(client_id, count = sessions.len(), "session recorded");
        Ok(())
    }

    pub async fn list(&self, client_id: &str) -> Result<Vec<SessionRecord>, AuthError> {
        match self.store.get(&session_key(client_id)).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tably_common::MemoryKvStore;

    fn registry() -> (SessionRegistry, Arc<MemoryKvStore>) {
        let store = Arc::new(MemoryKvStore::new("sessions"));
        (SessionRegistry::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_list_empty_for_unknown_client() {
        let (registry, _) = registry();
        assert!(registry.list("42").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let (registry, _) = registry();
        registry
            .append("42", SessionRecord::new("t1".into(), "mobile".into()))
            .await
            .unwrap();
        registry
            .append("42", SessionRecord::new("t2".into(), "web".into()))
            .await
            .unwrap();

        let sessions = registry.list("42").await.unwrap();
        let names: Vec<_> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["mobile", "web"]);
        assert!(registry.list("7").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stored_as_camel_case_json_array() {
        let (registry, store) = registry();
        registry
            .append("42", SessionRecord::new("t1".into(), "mobile".into()))
            .await
            .unwrap();

        let raw = store.get("sessions:42").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["token"], "t1");
        assert_eq!(value[0]["name"], "mobile");
        assert!(value[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_corrupt_list_is_an_error() {
        let (registry, store) = registry();
        store
            .put("sessions:42", "not json".to_string(), None)
            .await
            .unwrap();
        assert!(matches!(
            registry.list("42").await,
            Err(AuthError::CorruptRecord(_))
        ));
    }
}
