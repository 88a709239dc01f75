// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Sluice relay service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Sluice configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SluiceConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Account and token settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Remote reasoning-engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Agent registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Browser origins allowed by the CORS layer.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

/// Account and token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Email domain required for signup.
    #[serde(default = "default_required_domain")]
    pub required_domain: String,

    /// HS256 signing secret for access tokens. When unset, a random secret
    /// is generated at startup (tokens then expire on restart).
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Access-token lifetime in days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u16,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required_domain: default_required_domain(),
            jwt_secret: None,
            token_ttl_days: default_token_ttl_days(),
        }
    }
}

fn default_required_domain() -> String {
    "asl.apps-eval.com".to_string()
}

fn default_token_ttl_days() -> u16 {
    7
}

/// Remote reasoning-engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Cloud project owning the deployed reasoning engines.
    #[serde(default = "default_project")]
    pub project: String,

    /// Region of the reasoning-engine API.
    #[serde(default = "default_location")]
    pub location: String,

    /// Override for the platform API base URL. Unset in production; set by
    /// tests to point at a mock server.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Static bearer token for the platform API. When unset, requests are
    /// sent without a platform credential (suitable behind a metadata proxy).
    #[serde(default)]
    pub api_token: Option<String>,

    /// Overall per-query deadline in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum seconds to wait between upstream chunks.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project: default_project(),
            location: default_location(),
            base_url: None,
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

fn default_project() -> String {
    "qwiklabs-asl-04-8e9f23e85ced".to_string()
}

fn default_location() -> String {
    "us-central1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    180
}

fn default_idle_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "sluice.db".to_string()
}

/// Agent registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Cache time-to-live in seconds.
    #[serde(default = "default_registry_ttl_secs")]
    pub ttl_secs: u64,

    /// Statically configured agents. When non-empty, the registry serves
    /// these instead of listing the platform directory.
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_registry_ttl_secs(),
            agents: Vec::new(),
        }
    }
}

fn default_registry_ttl_secs() -> u64 {
    300
}

/// One statically configured agent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentEntry {
    /// Logical name used by callers.
    pub name: String,

    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,

    /// Short description.
    #[serde(default)]
    pub description: String,

    /// Remote reasoning-engine id. Empty means listed but unavailable.
    #[serde(default)]
    pub engine_id: String,
}
