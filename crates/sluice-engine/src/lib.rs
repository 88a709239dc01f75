// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote reasoning-engine client and streaming relay.
//!
//! [`EngineClient`] speaks the platform's `:streamQuery` and directory
//! endpoints; [`relay::run_relay`] drives one query through the
//! resolve/dispatch/ingest/emit/finalize state machine, yielding live
//! [`relay::RelayEvent`]s to the HTTP surface.

pub mod client;
pub mod frames;
pub mod relay;

pub use client::{EngineClient, EngineListing};
pub use relay::{RelayEvent, RelayTimeouts, run_relay};
