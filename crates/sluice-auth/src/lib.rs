// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store for the Sluice relay service.
//!
//! Accounts live in the SQLite identity table (`sluice-storage`); this crate
//! layers password hashing, bearer-token issue/verify, and the soft-delete
//! lifecycle on top. Tokens are stateless HS256 JWTs checked against the
//! live account state on every request.

pub mod ids;
pub mod password;
pub mod service;
pub mod token;

pub use service::{AccountService, SignupError};
pub use token::TokenSigner;
