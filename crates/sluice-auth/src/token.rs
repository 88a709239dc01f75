// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token signing and verification (HS256).
//!
//! Tokens are never stored server-side: validity is cryptographic
//! (signature + expiry) plus a per-request check that the embedded user is
//! still active, performed by the account service.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sluice_core::{Claims, SluiceError, User};

/// Signs and verifies access tokens with a shared HS256 secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    /// Create a signer with the given secret and token lifetime in days.
    pub fn new(secret: &[u8], ttl_days: u16) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::days(i64::from(ttl_days)),
        }
    }

    /// Mint a signed token for the user.
    pub fn issue(&self, user: &User) -> Result<String, SluiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.user_id.clone(),
            email: user.email.clone(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| SluiceError::Internal(format!("token encode: {e}")))
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// Malformed, forged, and expired tokens all collapse into the same
    /// `Unauthorized` error.
    pub fn verify(&self, token: &str) -> Result<Claims, SluiceError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| SluiceError::Unauthorized("invalid or expired token".to_string()))
    }

    #[cfg(test)]
    pub(crate) fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
