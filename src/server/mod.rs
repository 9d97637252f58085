//! PUBG Scout Server Module
//!
//! Serves the scouting form, the rendered verdict page and a small JSON API
//! on top of one artifact pair loaded at startup.

mod api;
mod error;
mod handlers;
mod state;
mod templates;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::ScoutForm;
pub use state::AppState;

use crate::inference::Predictor;
use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `scaler.bin` and `model.bin`
    pub artifact_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            artifact_dir: std::env::var("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Load the artifacts and serve until ctrl+c.
///
/// Missing or mismatched artifacts abort startup: the service cannot answer
/// any request without them.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let predictor = Predictor::load(&config.artifact_dir).with_context(|| {
        format!(
            "cannot start without artifacts in {}",
            config.artifact_dir.display()
        )
    })?;
    info!(
        pair_id = %predictor.metadata().pair_id,
        trained_at = %predictor.metadata().created_at.to_rfc3339(),
        "Model loaded"
    );

    let state = Arc::new(AppState::new(config.clone(), predictor));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        started_at = %start_time.to_rfc3339(),
        "PUBG Scout server starting"
    );
    info!(url = %format!("http://{}", addr), "Scouting form available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl+c");
            return;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
