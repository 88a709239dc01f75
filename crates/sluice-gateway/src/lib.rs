// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for the Sluice relay service.
//!
//! Thin routing over the credential store, history store, agent registry,
//! and streaming relay. Authentication and authorization resolve before any
//! relay work begins; failures during a committed stream terminate it with
//! an in-band error event instead of an HTTP status.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{GatewayState, ServerConfig, build_router, start_server};
