// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Sluice configuration system.

use sluice_config::diagnostic::suggest_key;
use sluice_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_sluice_config() {
    let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
log_level = "debug"
cors_origins = ["http://localhost:3000"]

[auth]
required_domain = "example.com"
jwt_secret = "not-a-real-secret"
token_ttl_days = 3

[engine]
project = "demo-project"
location = "europe-west1"
request_timeout_secs = 120
idle_timeout_secs = 20

[storage]
database_path = "/tmp/sluice-test.db"

[registry]
ttl_secs = 60

[[registry.agents]]
name = "bq_agent"
display_name = "BigQuery Agent"
description = "data analysis"
engine_id = "1234567890"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.auth.required_domain, "example.com");
    assert_eq!(config.auth.jwt_secret.as_deref(), Some("not-a-real-secret"));
    assert_eq!(config.auth.token_ttl_days, 3);
    assert_eq!(config.engine.project, "demo-project");
    assert_eq!(config.engine.location, "europe-west1");
    assert_eq!(config.storage.database_path, "/tmp/sluice-test.db");
    assert_eq!(config.registry.ttl_secs, 60);
    assert_eq!(config.registry.agents.len(), 1);
    assert_eq!(config.registry.agents[0].engine_id, "1234567890");
}

/// Unknown field in [server] produces an error mentioning the bad key.
#[test]
fn unknown_field_in_server_produces_error() {
    let toml = r#"
[server]
prot = 9000
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("prot"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections fall back to defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.auth.token_ttl_days, 7);
    assert_eq!(config.engine.location, "us-central1");
    assert_eq!(config.registry.ttl_secs, 300);
}

/// Validation errors are collected, not fail-fast.
#[test]
fn validation_collects_all_errors() {
    let toml = r#"
[auth]
required_domain = ""
token_ttl_days = 0

[storage]
database_path = ""
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors.len() >= 3, "expected 3+ errors, got {}", errors.len());
}

/// The suggestion engine catches near-miss section keys.
#[test]
fn typo_suggestion_for_engine_keys() {
    let valid = &[
        "project",
        "location",
        "base_url",
        "api_token",
        "request_timeout_secs",
        "idle_timeout_secs",
    ];
    assert_eq!(
        suggest_key("locaton", valid),
        Some("location".to_string())
    );
}

/// Validated config round-trips through the happy path.
#[test]
fn load_and_validate_accepts_good_config() {
    let toml = r#"
[server]
port = 8080
"#;
    let config = load_and_validate_str(toml).expect("good config should validate");
    assert_eq!(config.server.port, 8080);
}
