// --- File: crates/tably_common/src/http/client.rs ---
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::{Client, Error as ReqwestError};

/// Used when a configured timeout is zero.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("tably/", env!("CARGO_PKG_VERSION"));

/// Builds the outbound client used for upstream APIs.
///
/// `timeout_secs` bounds both connecting and the whole request. With
/// `follow_redirects` at most five redirects are followed.
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    let timeout = match timeout_secs {
        0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        secs => Duration::from_secs(secs),
    };
    let redirect = if follow_redirects {
        Policy::limited(5)
    } else {
        Policy::none()
    };

    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .timeout(timeout)
        .redirect(redirect)
        .build()
}
