//! Serve command handler.
//!
//! Runs the HTTP front door until Ctrl-C.

use crate::bootstrap::build_assistant;
use crate::server::{router, AppState};
use clap::Args;
use hurtbot_core::{config::AppConfig, AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Bind address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let assistant = build_assistant(config)?;
        let state = Arc::new(AppState {
            assistant: Arc::new(assistant),
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        });

        let host = self.host.as_deref().unwrap_or(&config.server.host);
        let port = self.port.unwrap_or(config.server.port);
        let addr = format!("{}:{}", host, port);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Listening on http://{}", addr);

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
