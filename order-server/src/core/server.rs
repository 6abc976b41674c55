//! Server Implementation
//!
//! HTTP server startup and shutdown around the shared [`ServerState`].

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use crate::core::{tasks, ServerState};
use crate::utils::{AppError, AppResult};

pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Run until ctrl-c, then stop the background sweep and drain.
    pub async fn run(&self) -> AppResult<()> {
        let shutdown = CancellationToken::new();
        let sweep = tasks::spawn_panel_sweep(self.state.clone(), shutdown.clone());

        let app = crate::api::router(self.state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!("Order hub listening on {addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        shutdown.cancel();
        let _ = sweep.await;
        Ok(())
    }
}
