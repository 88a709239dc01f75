// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing and verification.
//!
//! Hashes are stored as PHC strings, so the cost parameters travel with the
//! hash and can be raised later without invalidating existing accounts.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::Argon2;
use sluice_core::SluiceError;

/// Minimum accepted password length in bytes.
pub const MIN_PASSWORD_BYTES: usize = 6;

/// Maximum accepted password length in bytes. Oversized passwords are
/// rejected outright rather than silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// True when the password's byte length is within the accepted bound.
///
/// The bound is on bytes, not characters: multi-byte UTF-8 counts fully.
pub fn password_within_bounds(password: &str) -> bool {
    let len = password.len();
    (MIN_PASSWORD_BYTES..=MAX_PASSWORD_BYTES).contains(&len)
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, SluiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| SluiceError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string.
///
/// Comparison of the derived key is constant-time inside the argon2 crate.
/// Unparseable hashes verify as false rather than erroring, so a corrupt
/// row behaves like a wrong password.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
