// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Sluice workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a user account.
///
/// Accounts are never hard-deleted: deactivation keeps history rows
/// attributable while making them inaccessible. Modeled as an enum rather
/// than a boolean so every read site handles both states explicitly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    Active,
    Deactivated,
}

/// An identity record. The password hash never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque, URL-safe identifier. Immutable once created.
    pub user_id: String,
    /// Lowercased email within the required domain.
    pub email: String,
    /// Lifecycle state.
    pub state: UserState,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-update timestamp.
    pub updated_at: String,
}

impl User {
    /// True when the account may authenticate and act.
    pub fn is_active(&self) -> bool {
        self.state == UserState::Active
    }
}

/// Verified bearer-token payload, threaded explicitly through the call
/// chain of every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id (`sub` in the signed payload).
    pub sub: String,
    /// Email at token-issue time.
    pub email: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
    /// Issued-at as a unix timestamp.
    pub iat: i64,
}

/// One persisted chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Record id, freshly generated on write.
    pub id: String,
    /// Owning user id. Immutable; always the authenticated caller at write.
    pub user_id: String,
    /// Logical name of the agent that answered.
    pub agent_name: String,
    /// The caller's message.
    pub message: String,
    /// The reassembled response text.
    pub response: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A resolvable remote agent target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Logical name used by callers to select this agent.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Short description.
    pub description: String,
    /// Remote reasoning-engine identifier. Empty means the agent is listed
    /// but unavailable and must never be dispatched to.
    pub engine_id: String,
}

impl AgentDescriptor {
    /// True when the descriptor carries a resolvable endpoint identifier.
    pub fn is_available(&self) -> bool {
        !self.engine_id.is_empty()
    }
}

/// Seam between the streaming relay and the history store.
///
/// The relay persists a completed exchange through this trait so the engine
/// crate stays independent of the storage backend.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one completed exchange; returns the new record id.
    async fn append(
        &self,
        user_id: &str,
        agent_name: &str,
        message: &str,
        response: &str,
    ) -> Result<String, crate::SluiceError>;
}
