// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Sluice relay service.

use thiserror::Error;

/// The primary error type used across all Sluice crates.
#[derive(Debug, Error)]
pub enum SluiceError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence backend errors (database connection, query failure).
    ///
    /// Treated as `StoreUnavailable` at the HTTP boundary: advisory for an
    /// in-flight relay, loud for direct store operations.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Remote reasoning-engine errors (non-200 status, connect failure,
    /// unusable response body).
    #[error("engine error: {message}")]
    Engine {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller presented no credential, or a malformed, forged, expired
    /// one, or one belonging to a deactivated user.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but acting on another user's resources.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A named resource (agent, history record) does not exist for this caller.
    #[error("{resource} not found: {name}")]
    NotFound { resource: String, name: String },

    /// Request payload violates a policy (email domain, password bounds,
    /// malformed identifier).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SluiceError {
    /// Shorthand for a [`SluiceError::NotFound`] with owned strings.
    pub fn not_found(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            name: name.into(),
        }
    }
}
