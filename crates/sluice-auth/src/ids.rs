// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random identifier and secret generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ring::rand::{SecureRandom, SystemRandom};
use sluice_core::SluiceError;

/// Entropy carried by a user id, in bytes.
const USER_ID_BYTES: usize = 16;

/// Bytes of entropy in a generated signing secret.
const SECRET_BYTES: usize = 32;

/// Generate an opaque, URL-safe user identifier (16 bytes of entropy).
pub fn new_user_id() -> Result<String, SluiceError> {
    let mut bytes = [0u8; USER_ID_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| SluiceError::Internal("failed to generate user id".to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate a random HS256 signing secret for deployments that configure
/// none. Tokens signed with it do not survive a restart.
pub fn random_secret() -> Result<String, SluiceError> {
    let mut bytes = [0u8; SECRET_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| SluiceError::Internal("failed to generate signing secret".to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
