// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP error mapping.
//!
//! Converts workspace errors into status codes plus a JSON `{"error": ...}`
//! body. Failures inside a committed event stream never pass through here;
//! those terminate the stream with an in-band error event instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sluice_core::SluiceError;
use sluice_auth::SignupError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error description.
    pub error: String,
}

/// An error ready to leave the HTTP surface.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<SluiceError> for ApiError {
    fn from(err: SluiceError) -> Self {
        let status = match &err {
            SluiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SluiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            SluiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            SluiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SluiceError::Engine { .. } => StatusCode::BAD_GATEWAY,
            SluiceError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            SluiceError::Storage { .. } => StatusCode::SERVICE_UNAVAILABLE,
            SluiceError::Config(_) | SluiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<SignupError> for ApiError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::InvalidDomain(_)
            | SignupError::InvalidPassword
            | SignupError::DuplicateAccount => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            SignupError::Store(inner) => inner.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sluice_errors_map_to_expected_statuses() {
        let cases: Vec<(SluiceError, StatusCode)> = vec![
            (
                SluiceError::Unauthorized("x".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (SluiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                SluiceError::not_found("agent", "x"),
                StatusCode::NOT_FOUND,
            ),
            (
                SluiceError::InvalidInput("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                SluiceError::Storage {
                    source: Box::new(std::io::Error::other("x")),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn signup_policy_violations_are_bad_requests() {
        assert_eq!(
            ApiError::from(SignupError::InvalidPassword).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SignupError::DuplicateAccount).status,
            StatusCode::BAD_REQUEST
        );
    }
}
