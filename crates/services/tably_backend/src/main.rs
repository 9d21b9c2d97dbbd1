// File: services/tably_backend/src/main.rs
use std::sync::Arc;

use tably_backend::{routes, AppState};
use tably_common::logging;
use tably_config::load_config;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = load_config()?;
    let state = Arc::new(AppState::from_config(&config).await?);
    let app = routes(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
