//! Web shell tunnel gateway
//!
//! Listens for browser WebSocket connections and bridges each one to its own
//! interactive SSH shell.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wst_core::config::{self, HostKeyPolicy, TunnelConfig};
use wst_gateway::remote::SshConnector;
use wst_gateway::server::GatewayServer;
use wst_gateway::GatewayState;

#[derive(Parser)]
#[command(name = "wst-gateway")]
#[command(about = "Bridges browser WebSocket connections to a remote SSH shell")]
#[command(version)]
struct Args {
    /// Port to listen for WebSocket connections
    #[arg(short, long)]
    port: Option<u16>,

    /// SSH server address
    #[arg(long = "ip-address", visible_alias = "host")]
    ip_address: Option<String>,

    /// SSH user
    #[arg(short, long)]
    username: Option<String>,

    /// SSH password
    #[arg(long, env = "WST_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// SSH server port
    #[arg(long)]
    remote_port: Option<u16>,

    /// Interface to bind (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Only accept an SSH host key with this SHA-256 fingerprint
    #[arg(long)]
    host_key_fingerprint: Option<String>,

    /// Browser origin allowed to connect (repeatable; default: any)
    #[arg(long = "allowed-origin")]
    allowed_origins: Vec<String>,

    /// Maximum number of concurrent sessions
    #[arg(long)]
    max_sessions: Option<usize>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run in foreground with verbose output
    #[arg(short, long)]
    foreground: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Apply command-line overrides on top of file configuration
    fn apply(self, config: &mut TunnelConfig) {
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
        if let Some(bind) = self.bind {
            config.gateway.bind_address = bind;
        }
        if !self.allowed_origins.is_empty() {
            config.gateway.allowed_origins = self.allowed_origins;
        }
        if self.max_sessions.is_some() {
            config.gateway.max_sessions = self.max_sessions;
        }
        if let Some(host) = self.ip_address {
            config.remote.host = host;
        }
        if let Some(port) = self.remote_port {
            config.remote.port = port;
        }
        if let Some(username) = self.username {
            config.remote.username = username;
        }
        if let Some(password) = self.password {
            config.remote.password = password;
        }
        if let Some(fingerprint) = self.host_key_fingerprint {
            config.remote.host_key = HostKeyPolicy::Fingerprint { fingerprint };
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.foreground { "debug" } else { &args.log_level };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config: TunnelConfig = if let Some(config_path) = &args.config {
        config::load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        let default_path = config::default_config_path();
        if default_path.exists() {
            config::load_config(&default_path)
                .with_context(|| format!("Failed to load config from {:?}", default_path))?
        } else {
            TunnelConfig::default()
        }
    };

    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if config.remote.host_key.is_insecure() {
        tracing::warn!(
            "SSH host key verification is disabled; set a host key fingerprint to protect against interception"
        );
    }
    if config.gateway.allowed_origins.is_empty() {
        tracing::info!("Accepting WebSocket upgrades from any origin");
    }

    tracing::info!(
        "Tunneling to {} as '{}'",
        config.remote.address(),
        config.remote.username
    );

    // Cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    let connector = Arc::new(SshConnector::new(config.remote.clone()));
    let state = Arc::new(GatewayState::new(config.gateway.clone(), connector, cancel));

    let server = GatewayServer::new(state);
    server.run().await?;

    tracing::info!("Gateway shutdown complete");
    Ok(())
}
