// --- File: crates/tably_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::fmt;

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Auth Config ---
// jwt_secret is normally "secret_from_env" in the config file and is
// replaced from TABLY_SECRET_AUTH_JWT_SECRET (or AUTH_JWT_SECRET) on load.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Cookie read as a fallback carrier for the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_otp_length")]
    pub otp_length: usize,
    #[serde(default = "default_otp_ttl_seconds")]
    pub otp_ttl_seconds: u64,
    /// SMS body; `{code}` is replaced with the generated code.
    #[serde(default = "default_sms_template")]
    pub sms_template: String,
    /// When unset, tokens carry no `exp` claim and never expire.
    #[serde(default)]
    pub token_ttl_seconds: Option<u64>,
    /// Delete the code after the first successful verification.
    #[serde(default)]
    pub otp_single_use: bool,
    /// Delete the stored code again when the SMS could not be delivered.
    #[serde(default)]
    pub rollback_otp_on_sms_failure: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("otp_length", &self.otp_length)
            .field("otp_ttl_seconds", &self.otp_ttl_seconds)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("otp_single_use", &self.otp_single_use)
            .field("rollback_otp_on_sms_failure", &self.rollback_otp_on_sms_failure)
            .finish()
    }
}

// --- POS Config ---
// access_token is loaded from TABLY_SECRET_POS_ACCESS_TOKEN (or POS_ACCESS_TOKEN).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Deserialize, Serialize, Clone)]
pub struct PosConfig {
    /// Base URL of the POS API, without trailing slash.
    pub api_url: String,
    pub access_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Group new clients are created in, if the POS requires one.
    #[serde(default)]
    pub client_group_id: Option<u64>,
    #[serde(default = "default_sms_method")]
    pub sms_method: String,
}

impl fmt::Debug for PosConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PosConfig")
            .field("api_url", &self.api_url)
            .field("access_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("client_group_id", &self.client_group_id)
            .field("sms_method", &self.sms_method)
            .finish()
    }
}

// --- KV Config ---
/// Where OTP codes and session lists live.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KvBackend {
    /// Process memory; lost on restart and not shared between instances.
    #[default]
    Memory,
    /// A SQL database reached through `database_url`.
    Sql,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KvConfig {
    #[serde(default)]
    pub backend: KvBackend,
    /// e.g. `sqlite://data/tably.db` or `postgres://...`; required for `sql`.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_otp_namespace")]
    pub otp_namespace: String,
    #[serde(default = "default_sessions_namespace")]
    pub sessions_namespace: String,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            backend: KvBackend::default(),
            database_url: None,
            otp_namespace: default_otp_namespace(),
            sessions_namespace: default_sessions_namespace(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub pos: PosConfig,
    #[serde(default)]
    pub kv: KvConfig,
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_otp_length() -> usize {
    6
}

fn default_otp_ttl_seconds() -> u64 {
    300
}

fn default_sms_template() -> String {
    "Your verification code: {code}".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_sms_method() -> String {
    "marketing.sendSms".to_string()
}

fn default_otp_namespace() -> String {
    "otp".to_string()
}

fn default_sessions_namespace() -> String {
    "sessions".to_string()
}
