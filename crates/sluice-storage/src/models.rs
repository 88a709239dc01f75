// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-internal row types.
//!
//! The public domain types live in `sluice-core`; this module adds the one
//! shape that must never cross the storage boundary: the user row carrying
//! its password hash.

use sluice_core::{User, UserState};

pub use sluice_core::QueryRecord;

/// A full user row, including the password hash.
///
/// Only `sluice-auth` consumes this; everything above the credential store
/// sees [`User`].
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user_id: String,
    pub email: String,
    pub password_hash: String,
    pub state: UserState,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredUser {
    /// Strip the hash for callers outside the credential store.
    pub fn into_user(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
            state: self.state,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
