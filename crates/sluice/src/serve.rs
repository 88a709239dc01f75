// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sluice serve` command implementation.
//!
//! Wires the credential store, history store, agent registry, and engine
//! client together and runs the gateway until the process is stopped.

use std::sync::Arc;
use std::time::Duration;

use sluice_auth::{AccountService, TokenSigner, ids};
use sluice_config::SluiceConfig;
use sluice_core::{AgentDescriptor, SluiceError};
use sluice_engine::{EngineClient, RelayTimeouts};
use sluice_registry::{
    AgentRegistry, DirectorySource, PlatformDirectory, StaticDirectory, SystemClock,
};
use sluice_storage::{Database, HistoryStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Runs the `sluice serve` command.
pub async fn run_serve(config: SluiceConfig) -> Result<(), SluiceError> {
    init_tracing(&config.server.log_level);

    info!("starting sluice serve");

    // Storage.
    let db = Database::open(&config.storage.database_path).await?;

    // Credential store. A missing signing secret gets a random one; every
    // outstanding token dies on restart in that mode.
    let secret = match &config.auth.jwt_secret {
        Some(secret) => secret.clone(),
        None => {
            warn!("auth.jwt_secret not configured; generated an ephemeral secret");
            ids::random_secret()?
        }
    };
    let accounts = Arc::new(AccountService::new(
        db.clone(),
        TokenSigner::new(secret.as_bytes(), config.auth.token_ttl_days),
        config.auth.required_domain.clone(),
    ));

    let history = Arc::new(HistoryStore::new(db));

    // Engine client, shared by the relay and the platform directory.
    let engine = EngineClient::new(
        config.engine.project.clone(),
        config.engine.location.clone(),
        config.engine.base_url.clone(),
        config.engine.api_token.clone(),
    )?;

    // Registry: statically configured agents win; otherwise list the
    // platform directory.
    let source: Arc<dyn DirectorySource> = if config.registry.agents.is_empty() {
        info!("agent registry backed by the platform directory");
        Arc::new(PlatformDirectory::new(engine.clone()))
    } else {
        info!(
            count = config.registry.agents.len(),
            "agent registry backed by static configuration"
        );
        let agents = config
            .registry
            .agents
            .iter()
            .map(|entry| AgentDescriptor {
                name: entry.name.clone(),
                display_name: if entry.display_name.is_empty() {
                    entry.name.clone()
                } else {
                    entry.display_name.clone()
                },
                description: entry.description.clone(),
                engine_id: entry.engine_id.clone(),
            })
            .collect();
        Arc::new(StaticDirectory::new(agents))
    };
    let registry = Arc::new(AgentRegistry::new(
        source,
        Duration::from_secs(config.registry.ttl_secs),
        Arc::new(SystemClock),
    ));

    let state = sluice_gateway::GatewayState {
        accounts,
        history,
        registry,
        engine,
        timeouts: RelayTimeouts {
            overall: Duration::from_secs(config.engine.request_timeout_secs),
            idle: Duration::from_secs(config.engine.idle_timeout_secs),
        },
        project: config.engine.project.clone(),
        location: config.engine.location.clone(),
    };

    let server_config = sluice_gateway::ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        cors_origins: config.server.cors_origins.clone(),
    };

    sluice_gateway::start_server(&server_config, state).await
}

/// Initialize the tracing subscriber once, honoring `RUST_LOG` overrides.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
