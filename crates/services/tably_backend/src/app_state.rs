// --- File: crates/services/tably_backend/src/app_state.rs ---
use std::sync::Arc;
use std::time::Duration;

use tably_auth::{OtpEngine, SessionRegistry, TokenService};
use tably_common::{KvStore, MemoryKvStore};
use tably_config::env_vars::SECRET_MARKER;
use tably_config::{AppConfig, AuthConfig, KvBackend, KvConfig};
use tably_db::{DbClient, DbError, SqlKvStore};
use tably_pos::{PosClient, PosError, PosService};
use thiserror::Error;
use tracing::{info, warn};

/// The POS gateway as held by handlers.
pub type SharedPos = Arc<dyn PosService<Error = PosError>>;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("{0} is not set; provide it through the environment")]
    MissingSecret(&'static str),
    #[error("Failed to build POS client: {0}")]
    Pos(#[from] PosError),
    #[error("kv.database_url is required for the sql backend")]
    MissingDatabaseUrl,
    #[error("Failed to open the KV database: {0}")]
    Db(#[from] DbError),
}

/// Everything the handlers need, built once at startup and shared as
/// `Arc<AppState>`.
pub struct AppState {
    pub tokens: TokenService,
    pub otp: OtpEngine,
    pub sessions: SessionRegistry,
    pub pos: SharedPos,
    /// Cookie checked when no bearer header is present.
    pub cookie_name: String,
    pub sms_template: String,
    pub rollback_otp_on_sms_failure: bool,
}

impl AppState {
    /// Builds the production state: the configured KV backend and the HTTP POS client.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        check_secret("auth.jwt_secret", &config.auth.jwt_secret)?;
        check_secret("pos.access_token", &config.pos.access_token)?;

        let pos: SharedPos = Arc::new(PosClient::new(&config.pos)?);
        info!(api_url = %config.pos.api_url, "POS client ready");

        match config.kv.backend {
            KvBackend::Memory => {
                warn!("KV backend is in-memory; sessions are lost on restart");
                Ok(Self::new(&config.auth, &config.kv, pos))
            }
            KvBackend::Sql => {
                let (otp_store, session_store) = open_sql_stores(&config.kv).await?;
                info!("KV backend is SQL");
                Ok(Self::with_stores(&config.auth, otp_store, session_store, pos))
            }
        }
    }

    /// Builds the state around an existing POS gateway, with fresh in-memory KV stores.
    pub fn new(auth: &AuthConfig, kv: &KvConfig, pos: SharedPos) -> Self {
        let otp_store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new(kv.otp_namespace.clone()));
        let session_store: Arc<dyn KvStore> =
            Arc::new(MemoryKvStore::new(kv.sessions_namespace.clone()));
        Self::with_stores(auth, otp_store, session_store, pos)
    }

    pub fn with_stores(
        auth: &AuthConfig,
        otp_store: Arc<dyn KvStore>,
        session_store: Arc<dyn KvStore>,
        pos: SharedPos,
    ) -> Self {
        let tokens = TokenService::new(&auth.jwt_secret)
            .with_ttl(auth.token_ttl_seconds.map(Duration::from_secs));
        let otp = OtpEngine::new(otp_store)
            .with_length(auth.otp_length)
            .with_ttl(Duration::from_secs(auth.otp_ttl_seconds))
            .with_single_use(auth.otp_single_use);

        Self {
            tokens,
            otp,
            sessions: SessionRegistry::new(session_store),
            pos,
            cookie_name: auth.cookie_name.clone(),
            sms_template: auth.sms_template.clone(),
            rollback_otp_on_sms_failure: auth.rollback_otp_on_sms_failure,
        }
    }

    /// SMS body for `code`.
    pub fn sms_text(&self, code: &str) -> String {
        self.sms_template.replace("{code}", code)
    }
}

/// Opens both namespaces on one connection pool.
pub async fn open_sql_stores(
    kv: &KvConfig,
) -> Result<(Arc<dyn KvStore>, Arc<dyn KvStore>), StartupError> {
    let url = kv
        .database_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or(StartupError::MissingDatabaseUrl)?;
    let db = DbClient::from_url(url).await?;
    let otp_store = SqlKvStore::open(db.clone(), kv.otp_namespace.clone()).await?;
    let session_store = SqlKvStore::open(db, kv.sessions_namespace.clone()).await?;
    Ok((Arc::new(otp_store), Arc::new(session_store)))
}

fn check_secret(name: &'static str, value: &str) -> Result<(), StartupError> {
    if value.trim().is_empty() || value == SECRET_MARKER {
        return Err(StartupError::MissingSecret(name));
    }
    Ok(())
}
