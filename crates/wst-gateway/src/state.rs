//! Gateway state shared by all request handlers

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use wst_core::config::GatewayConfig;
use wst_core::traits::RemoteConnector;

use crate::server::OriginPolicy;
use crate::session::{SessionCoordinator, SessionRegistry};

/// Process-wide state: listener configuration plus the live-session registry
pub struct GatewayState {
    /// Listener configuration
    pub config: GatewayConfig,
    /// Origin allow-list built from the configuration
    pub origins: OriginPolicy,
    /// Session coordinator
    pub coordinator: SessionCoordinator,
    /// Live sessions
    pub sessions: Arc<SessionRegistry>,
    /// Cancelled when the process shuts down
    pub shutdown: CancellationToken,
    /// Upgraded session tasks, awaited on shutdown
    pub tasks: TaskTracker,
}

impl GatewayState {
    /// Create gateway state around a remote connector
    pub fn new(
        config: GatewayConfig,
        connector: Arc<dyn RemoteConnector>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            origins: OriginPolicy::new(config.allowed_origins.clone()),
            config,
            coordinator: SessionCoordinator::new(connector),
            sessions: Arc::new(SessionRegistry::new()),
            shutdown,
            tasks: TaskTracker::new(),
        }
    }
}
