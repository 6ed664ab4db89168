mod app;
mod config;
mod error;
mod handlers;
mod models;
mod payload;

use fraudshield_common::{bind_listener, init_tracing, ServiceError};

use crate::config::AlertConfig;

/// Target for the alert and startup lines, kept at `info` under any `RUST_LOG`.
pub const ALERT_LOG_TARGET: &str = "alert";

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    let _guards = init_tracing("alert-service", &[ALERT_LOG_TARGET]);

    let config = AlertConfig::from_env();
    let app = app::build_router();
    let listener = bind_listener(config.port).await?;

    let port = listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(config.port);
    tracing::info!(target: ALERT_LOG_TARGET, "Alert service on port {port}");

    // Runs until the process is killed.
    axum::serve(listener, app).await.map_err(ServiceError::Serve)
}
