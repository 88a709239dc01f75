// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, domain shape, and timeout
//! ordering.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::SluiceConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SluiceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate host is not empty and looks like an IP or hostname.
    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    // Validate required_domain is a bare domain, not an address.
    let domain = config.auth.required_domain.trim();
    if domain.is_empty() {
        errors.push(ConfigError::Validation {
            message: "auth.required_domain must not be empty".to_string(),
        });
    } else if domain.contains('@') {
        errors.push(ConfigError::Validation {
            message: format!(
                "auth.required_domain `{domain}` must be a bare domain, not an email address"
            ),
        });
    }

    if config.auth.token_ttl_days == 0 {
        errors.push(ConfigError::Validation {
            message: "auth.token_ttl_days must be at least 1".to_string(),
        });
    }

    // Validate database_path is not empty.
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // The idle timeout bounds the gap between chunks and must leave room
    // inside the overall deadline.
    if config.engine.idle_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.idle_timeout_secs must be at least 1".to_string(),
        });
    }
    if config.engine.idle_timeout_secs >= config.engine.request_timeout_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.idle_timeout_secs ({}) must be shorter than engine.request_timeout_secs ({})",
                config.engine.idle_timeout_secs, config.engine.request_timeout_secs
            ),
        });
    }

    if config.registry.ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "registry.ttl_secs must be at least 1".to_string(),
        });
    }

    // Validate no duplicate agent names.
    let mut seen_names = HashSet::new();
    for agent in &config.registry.agents {
        if !seen_names.insert(&agent.name) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate agent name `{}` in [[registry.agents]] array",
                    agent.name
                ),
            });
        }
    }

    // Validate agent names are non-empty.
    for (i, agent) in config.registry.agents.iter().enumerate() {
        if agent.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("registry.agents[{i}].name must not be empty"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
