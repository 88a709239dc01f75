// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sluice.toml` > `~/.config/sluice/sluice.toml`
//! > `/etc/sluice/sluice.toml` with environment variable overrides via the
//! `SLUICE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SluiceConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sluice/sluice.toml` (system-wide)
/// 3. `~/.config/sluice/sluice.toml` (user XDG config)
/// 4. `./sluice.toml` (local directory)
/// 5. `SLUICE_*` environment variables
pub fn load_config() -> Result<SluiceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SluiceConfig::default()))
        .merge(Toml::file("/etc/sluice/sluice.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("sluice/sluice.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("sluice.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SluiceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SluiceConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SluiceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SluiceConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. `SLUICE_AUTH_REQUIRED_DOMAIN` must map
/// to `auth.required_domain`, not `auth.required.domain`.
fn env_provider() -> Env {
    Env::prefixed("SLUICE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: SLUICE_ENGINE_REQUEST_TIMEOUT_SECS -> "engine_request_timeout_secs"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("engine_", "engine.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("registry_", "registry.", 1);
        mapped.into()
    })
}
