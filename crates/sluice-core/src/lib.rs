// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Sluice relay service.
//!
//! This crate provides the error type, shared domain types, and the trait
//! seams used across the Sluice workspace. Components (credential store,
//! history store, agent registry, streaming relay) live in their own crates
//! and depend only on what is defined here.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SluiceError;
pub use types::{AgentDescriptor, Claims, QueryRecord, RecordSink, User, UserState};
