//! Campus navigation HTTP service.
//!
//! # Configuration
//!
//! - `CAMPUSNAV_DB` - Path to the campus database (default `/data/campusnav.db`)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `SNAPSHOT_TIMEOUT_MS` - Bound on one database access (default: 5000)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `METRICS_ENABLED` - Set to `false` to skip the Prometheus recorder

use std::net::SocketAddr;

use tracing::{error, info};

use campusnav_service::{
    init_logging, init_metrics, router, AppState, LoggingConfig, MetricsConfig, ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env());

    if let Err(e) = init_metrics(&MetricsConfig::from_env()) {
        tracing::warn!(error = %e, "continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(
        db_path = %config.db_path.display(),
        port = config.port,
        snapshot_timeout_ms = config.snapshot_timeout.as_millis() as u64,
        "starting campusnav service"
    );

    let state = AppState::load(&config).map_err(|e| {
        error!(error = %e, path = %config.db_path.display(), "failed to load application state");
        e
    })?;

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
