//! Connection pool over `sqlx::Any`, so the same code runs on SQLite and
//! Postgres depending on the URL scheme.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::any::AnyConnectOptions;
use sqlx::pool::PoolOptions;
use sqlx::Pool;
use tracing::{debug, error, info};

use crate::error::DbError;

#[derive(Debug, Clone)]
pub struct DbClient {
    pool: Pool<sqlx::Any>,
}

impl DbClient {
    /// Connects to `db_url`, creating the SQLite file and its directory when
    /// they do not exist yet.
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.trim().is_empty() {
            return Err(DbError::Url("database URL is empty".to_string()));
        }
        sqlx::any::install_default_drivers();

        let in_memory = db_url.contains(":memory:");
        let pool_options = if in_memory {
            // Every connection to :memory: is its own database.
            PoolOptions::<sqlx::Any>::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            PoolOptions::<sqlx::Any>::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .idle_timeout(Duration::from_secs(600))
        };

        let url = if in_memory {
            db_url.to_string()
        } else {
            prepare_sqlite_url(db_url)?
        };

        let pool = pool_options
            .connect_with(AnyConnectOptions::from_str(&url)?)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                DbError::Pool(e.to_string())
            })?;

        info!("Database pool created");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<sqlx::Any> {
        &self.pool
    }

    /// Runs a statement that returns no rows.
    pub async fn execute(&self, query: &str) -> Result<u64, DbError> {
        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| DbError::Query(e.to_string()))
    }

    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Non-SQLite URLs pass through. For SQLite, the parent directory is created
/// and `mode=rwc` is added so a missing file is created on connect.
fn prepare_sqlite_url(db_url: &str) -> Result<String, DbError> {
    let Some(rest) = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
    else {
        return Ok(db_url.to_string());
    };

    let (db_path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    if let Some(dir) = Path::new(db_path).parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("Creating directory for SQLite database: {:?}", dir);
            std::fs::create_dir_all(dir)
                .map_err(|e| DbError::Pool(format!("failed to create {}: {}", dir.display(), e)))?;
        }
    }

    Ok(match query {
        Some(query) if query.contains("mode=") => db_url.to_string(),
        Some(_) => format!("{db_url}&mode=rwc"),
        None => format!("{db_url}?mode=rwc"),
    })
}
