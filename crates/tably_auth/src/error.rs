// --- File: crates/tably_auth/src/error.rs ---
use tably_common::{field_error, KvError, TablyError};
use thiserror::Error;

/// Auth-specific error types.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The phone number is not valid E.164 after normalization
    #[error("Invalid phone number: {0:?}")]
    InvalidPhone(String),

    /// No code stored for the phone, or the submitted code differs
    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    /// No usable credentials on the request
    #[error("Unauthorized")]
    Unauthorized,

    /// Token could not be produced
    #[error("Token encoding failed: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),

    /// The backing key-value store failed
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// A stored session list could not be decoded or encoded
    #[error("Corrupt session record: {0}")]
    CorruptRecord(#[from] serde_json::Error),
}

impl From<AuthError> for TablyError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidPhone(_) => field_error("phone", "Invalid phone number"),
            AuthError::InvalidOrExpiredCode => TablyError::InvalidOrExpiredCode,
            AuthError::Unauthorized => TablyError::Unauthorized,
            AuthError::TokenEncoding(e) => TablyError::Internal(format!("token encoding: {}", e)),
            AuthError::Storage(e) => e.into(),
            AuthError::CorruptRecord(e) => TablyError::Storage(format!("session list: {}", e)),
        }
    }
}
