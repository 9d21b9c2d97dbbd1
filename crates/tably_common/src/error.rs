// --- File: crates/tably_common/src/error.rs ---
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field name → human readable messages, as returned in 400 responses.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The error type every handler maps its failures into.
///
/// Component crates define their own error enums and implement
/// `From<ComponentError> for TablyError`, so handlers can use `?` and still
/// end up with one of the variants below.
#[derive(Error, Debug)]
pub enum TablyError {
    /// The request body failed schema validation
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: FieldErrors,
    },

    /// Missing, malformed or otherwise invalid credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but acting on another subject's resource
    #[error("Forbidden")]
    Forbidden,

    /// A referenced upstream entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// OTP mismatch, or no code stored for the phone
    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    /// The POS call failed or returned a non-success envelope
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The key-value store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TablyError {
    /// Message safe to show to API callers. Server-side failures collapse to a
    /// generic text; the detailed cause is only logged.
    pub fn public_message(&self) -> String {
        match self {
            TablyError::Validation { message, .. } => message.clone(),
            TablyError::Unauthorized => "Unauthorized".to_string(),
            TablyError::Forbidden => "Forbidden".to_string(),
            TablyError::NotFound(what) => what.clone(),
            TablyError::InvalidOrExpiredCode => "Invalid or expired code".to_string(),
            TablyError::Upstream(_) | TablyError::Storage(_) | TablyError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for TablyError {
    fn status_code(&self) -> u16 {
        match self {
            TablyError::Validation { .. } => 400,
            TablyError::Unauthorized => 401,
            TablyError::Forbidden => 403,
            TablyError::NotFound(_) => 404,
            TablyError::InvalidOrExpiredCode => 401,
            TablyError::Upstream(_) => 500,
            TablyError::Storage(_) => 500,
            TablyError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for TablyError {
    fn from(err: serde_json::Error) -> Self {
        TablyError::Internal(format!("JSON error: {}", err))
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T, fields: FieldErrors) -> TablyError {
    TablyError::Validation {
        message: message.to_string(),
        fields,
    }
}

/// Validation error for a single field.
pub fn field_error(field: &str, message: impl Into<String>) -> TablyError {
    let message = message.into();
    let mut fields = FieldErrors::new();
    fields.insert(field.to_string(), vec![message.clone()]);
    TablyError::Validation {
        message: format!("Invalid {}: {}", field, message),
        fields,
    }
}

pub fn not_found<T: fmt::Display>(message: T) -> TablyError {
    TablyError::NotFound(message.to_string())
}

pub fn upstream_error<T: fmt::Display>(message: T) -> TablyError {
    TablyError::Upstream(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> TablyError {
    TablyError::Internal(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(field_error("phone", "bad").status_code(), 400);
        assert_eq!(TablyError::Unauthorized.status_code(), 401);
        assert_eq!(TablyError::InvalidOrExpiredCode.status_code(), 401);
        assert_eq!(TablyError::Forbidden.status_code(), 403);
        assert_eq!(not_found("Client not found").status_code(), 404);
        assert_eq!(upstream_error("boom").status_code(), 500);
        assert_eq!(internal_error("boom").status_code(), 500);
    }

    #[test]
    fn test_public_message_hides_server_details() {
        let err = upstream_error("POS said: token 123 revoked");
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("token 123 revoked"));
    }

    #[test]
    fn test_field_error_records_field() {
        match field_error("code", "must be 6 characters") {
            TablyError::Validation { fields, .. } => {
                assert_eq!(fields["code"], vec!["must be 6 characters".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
