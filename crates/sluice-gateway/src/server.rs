// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. Public routes (banner,
//! health, agents, signup, login) live beside bearer-protected routes
//! (account, query, history); the protected set runs through the auth
//! middleware before any handler executes.

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use sluice_auth::AccountService;
use sluice_core::SluiceError;
use sluice_engine::{EngineClient, RelayTimeouts};
use sluice_registry::AgentRegistry;
use sluice_storage::HistoryStore;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::auth::require_auth;
use crate::handlers;
use crate::sse;

/// Shared state for axum request handlers.
///
/// Everything here is either immutable or internally synchronized; request
/// handlers never take locks.
#[derive(Clone)]
pub struct GatewayState {
    /// Credential store.
    pub accounts: Arc<AccountService>,
    /// Per-user history store.
    pub history: Arc<HistoryStore>,
    /// Agent directory cache.
    pub registry: Arc<AgentRegistry>,
    /// Reasoning-engine client.
    pub engine: EngineClient,
    /// Relay deadlines.
    pub timeouts: RelayTimeouts,
    /// Configured cloud project, echoed by /health.
    pub project: String,
    /// Configured region, echoed by /health.
    pub location: String,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Browser origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

/// Build the full application router.
pub fn build_router(state: GatewayState, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/agents", get(handlers::list_agents))
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login));

    let protected_routes = Router::new()
        .route(
            "/auth/me",
            get(handlers::me).delete(handlers::delete_me),
        )
        .route("/query/stream", post(sse::query_stream))
        .route("/query", post(sse::query_buffered))
        .route(
            "/history",
            get(handlers::list_history).delete(handlers::delete_all_history),
        )
        .route("/history/{id}", delete(handlers::delete_history_item))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS layer restricted to the configured browser origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind and serve until the process is stopped.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), SluiceError> {
    let app = build_router(state, &config.cors_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| SluiceError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| SluiceError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
