// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Sluice relay service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, typed user row
//! operations for the credential store, and the per-user [`HistoryStore`].

pub mod database;
pub mod history;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use history::HistoryStore;
pub use models::StoredUser;
