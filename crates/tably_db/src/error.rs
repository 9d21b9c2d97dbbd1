//! Error types for the database layer

use tably_common::KvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database URL error: {0}")]
    Url(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Database query error: {0}")]
    Query(String),
}

impl From<DbError> for KvError {
    fn from(err: DbError) -> Self {
        KvError::Backend(err.to_string())
    }
}
