// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer authentication middleware.
//!
//! Every protected route runs through [`require_auth`]: the token is
//! verified cryptographically and its user checked against live account
//! state, then the resulting [`Claims`] value is inserted into request
//! extensions for handlers to consume. There is no implicit current-user
//! global; identity travels with the request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sluice_core::Claims;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Middleware validating the `Authorization: Bearer <token>` header.
pub async fn require_auth(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Err(ApiError::unauthorized("missing bearer token"));
    };

    let claims = state.accounts.verify_token(token).await?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Strip a caller-supplied user id down to `[A-Za-z0-9_-]`.
///
/// Defense in depth ahead of the ownership check; generated ids are already
/// URL-safe base64 so a legitimate id passes through unchanged.
pub fn sanitize_user_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Resolve the effective user id for a history operation.
///
/// A missing parameter defaults to the token's subject; a present one must
/// match it exactly after sanitization.
pub fn history_scope(claims: &Claims, requested: Option<&str>) -> Result<String, ApiError> {
    match requested {
        None => Ok(claims.sub.clone()),
        Some(raw) => {
            let cleaned = sanitize_user_id(raw);
            if cleaned == claims.sub {
                Ok(cleaned)
            } else {
                Err(ApiError::forbidden("user_id does not match token"))
            }
        }
    }
}
