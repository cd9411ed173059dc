//! HTTP handlers: origin check and WebSocket upgrade

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use wst_core::TunnelError;

use crate::state::GatewayState;

/// Build the gateway router
///
/// A single route accepts the upgrade; the origin check runs before any
/// extractor on that route.
pub fn router(state: Arc<GatewayState>) -> Router {
    let path = state.config.path.clone();

    Router::new()
        .route(&path, get(upgrade))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            check_origin,
        ))
        .with_state(state)
}

/// Refuse browsers whose origin is not on the allow-list
async fn check_origin(
    State(state): State<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    if !state.origins.allows(origin.as_deref()) {
        tracing::warn!(origin = ?origin, "Rejected upgrade from disallowed origin");
        return (StatusCode::FORBIDDEN, "origin not allowed").into_response();
    }

    next.run(request).await
}

/// Upgrade to a WebSocket and hand the channel to the coordinator
async fn upgrade(
    State(state): State<Arc<GatewayState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(guard) = state
        .sessions
        .try_register(peer, state.config.max_sessions)
    else {
        tracing::warn!(peer = %peer, live = state.sessions.len(), "Session limit reached");
        return (StatusCode::SERVICE_UNAVAILABLE, "session limit reached").into_response();
    };

    let session_id = guard.id();
    tracing::info!(session = %session_id, peer = %peer, "New connection");

    let coordinator = state.coordinator.clone();
    let shutdown = state.shutdown.child_token();
    let tasks = state.tasks.clone();

    ws.protocols([state.config.subprotocol.clone()])
        .on_failed_upgrade(move |e: axum::Error| {
            let err = TunnelError::UpgradeFailed(e.to_string());
            tracing::warn!(session = %session_id, peer = %peer, "{}", err);
        })
        .on_upgrade(move |socket| {
            tasks.track_future(async move {
                coordinator.serve_websocket(guard, socket, shutdown).await;
            })
        })
}
