// --- File: crates/tably_pos/src/error.rs ---
use tably_common::TablyError;
use thiserror::Error;

/// Errors raised while talking to the POS API.
#[derive(Error, Debug)]
pub enum PosError {
    /// The request URL is stripped, it carries the access token.
    #[error("POS request failed: {0}")]
    Request(reqwest::Error),
    #[error("POS returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("POS method {method} returned an error: {message}")]
    Api { method: String, message: String },
    #[error("POS method {0} returned no response payload")]
    MissingResponse(String),
    #[error("Failed to parse POS response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for PosError {
    fn from(err: reqwest::Error) -> Self {
        PosError::Request(err.without_url())
    }
}

impl From<PosError> for TablyError {
    fn from(err: PosError) -> Self {
        TablyError::Upstream(err.to_string())
    }
}
