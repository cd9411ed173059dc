//! WebSocket gateway listener
//!
//! Accepts incoming HTTP connections and serves the upgrade route; each
//! upgraded connection runs its own session task.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::server::handler::router;
use crate::state::GatewayState;

/// How long shutdown waits for live sessions to finish tearing down
const SESSION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Gateway server that listens for browser connections
pub struct GatewayServer {
    /// Shared gateway state
    state: Arc<GatewayState>,
}

impl GatewayServer {
    /// Create a new gateway server
    pub fn new(state: Arc<GatewayState>) -> Self {
        Self { state }
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self) -> Result<()> {
        let bind_addr = self.state.config.listen_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind to {}", bind_addr))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            "Gateway listening on ws://{}{}",
            local_addr,
            self.state.config.path
        );

        let app = router(Arc::clone(&self.state));
        let shutdown = self.state.shutdown.clone();

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("Gateway shutting down");
        })
        .await
        .context("Gateway server failed")?;

        self.drain_sessions().await;
        Ok(())
    }

    /// Wait for session tasks to observe shutdown and finish
    async fn drain_sessions(&self) {
        let tasks = &self.state.tasks;
        tasks.close();

        if tokio::time::timeout(SESSION_DRAIN_TIMEOUT, tasks.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                "{} sessions still open after {:?}",
                tasks.len(),
                SESSION_DRAIN_TIMEOUT
            );
            return;
        }

        tracing::debug!("All sessions closed");
    }
}
