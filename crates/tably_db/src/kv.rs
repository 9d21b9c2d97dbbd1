//! [`KvStore`] on a SQL table shared by all namespaces.
//!
//! Expiry is stored as unix milliseconds in `expires_at` (NULL for keys that
//! never expire). Expired rows are hidden from reads and deleted on writes.

use std::sync::Arc;
use std::time::Duration;

use sqlx::Row;
use tably_common::{BoxFuture, KvError, KvStore};
use tracing::{debug, error, trace};

use crate::client::DbClient;
use crate::error::DbError;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_entries (
        namespace TEXT NOT NULL,
        entry_key TEXT NOT NULL,
        entry_value TEXT NOT NULL,
        expires_at BIGINT,
        PRIMARY KEY (namespace, entry_key)
    )
"#;

const SELECT_LIVE: &str = r#"
    SELECT entry_value FROM kv_entries
    WHERE namespace = $1 AND entry_key = $2
      AND (expires_at IS NULL OR expires_at > $3)
"#;

const UPSERT_EXPIRING: &str = r#"
    INSERT INTO kv_entries (namespace, entry_key, entry_value, expires_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (namespace, entry_key)
    DO UPDATE SET entry_value = excluded.entry_value, expires_at = excluded.expires_at
"#;

const UPSERT_PERMANENT: &str = r#"
    INSERT INTO kv_entries (namespace, entry_key, entry_value, expires_at)
    VALUES ($1, $2, $3, NULL)
    ON CONFLICT (namespace, entry_key)
    DO UPDATE SET entry_value = excluded.entry_value, expires_at = NULL
"#;

const DELETE_KEY: &str = "DELETE FROM kv_entries WHERE namespace = $1 AND entry_key = $2";

const DELETE_EXPIRED: &str = r#"
    DELETE FROM kv_entries
    WHERE namespace = $1 AND expires_at IS NOT NULL AND expires_at <= $2
"#;

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Durable [`KvStore`]; several instances may share one database.
#[derive(Clone)]
pub struct SqlKvStore {
    db: DbClient,
    namespace: String,
    clock: Clock,
}

impl SqlKvStore {
    /// Creates the table when missing and returns a store for `namespace`.
    pub async fn open(db: DbClient, namespace: impl Into<String>) -> Result<Self, DbError> {
        db.execute(CREATE_TABLE).await?;
        let namespace = namespace.into();
        debug!(%namespace, "SQL kv store ready");
        Ok(Self {
            db,
            namespace,
            clock: Arc::new(|| chrono::Utc::now().timestamp_millis()),
        })
    }

    /// Replaces the wall clock (unix milliseconds) used for expiry.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Rows currently stored for this namespace, expired ones included.
    pub async fn stored_entries(&self) -> Result<i64, DbError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM kv_entries WHERE namespace = $1")
            .bind(&self.namespace)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.try_get::<i64, _>("n")?)
    }

    async fn sweep(&self, now: i64) -> Result<(), DbError> {
        let purged = sqlx::query(DELETE_EXPIRED)
            .bind(&self.namespace)
            .bind(now)
            .execute(self.db.pool())
            .await?
            .rows_affected();
        if purged > 0 {
            trace!(namespace = %self.namespace, purged, "swept expired keys");
        }
        Ok(())
    }
}

impl std::fmt::Debug for SqlKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlKvStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

fn to_kv_error(err: sqlx::Error) -> KvError {
    error!("kv query failed: {}", err);
    DbError::from(err).into()
}

fn expiry_millis(now: i64, ttl: Duration) -> i64 {
    let ttl = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now.saturating_add(ttl)
}

impl KvStore for SqlKvStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, KvError> {
        let key = key.to_string();
        Box::pin(async move {
            let now = (self.clock)();
            let row = sqlx::query(SELECT_LIVE)
                .bind(&self.namespace)
                .bind(&key)
                .bind(now)
                .fetch_optional(self.db.pool())
                .await
                .map_err(to_kv_error)?;
            row.map(|row| row.try_get::<String, _>("entry_value"))
                .transpose()
                .map_err(to_kv_error)
        })
    }

    fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> BoxFuture<'_, (), KvError> {
        let key = key.to_string();
        Box::pin(async move {
            let now = (self.clock)();
            self.sweep(now).await?;

            let query = match ttl {
                Some(ttl) => sqlx::query(UPSERT_EXPIRING)
                    .bind(&self.namespace)
                    .bind(&key)
                    .bind(value)
                    .bind(expiry_millis(now, ttl)),
                None => sqlx::query(UPSERT_PERMANENT)
                    .bind(&self.namespace)
                    .bind(&key)
                    .bind(value),
            };
            query.execute(self.db.pool()).await.map_err(to_kv_error)?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, (), KvError> {
        let key = key.to_string();
        Box::pin(async move {
            sqlx::query(DELETE_KEY)
                .bind(&self.namespace)
                .bind(&key)
                .execute(self.db.pool())
                .await
                .map_err(to_kv_error)?;
            Ok(())
        })
    }
}
