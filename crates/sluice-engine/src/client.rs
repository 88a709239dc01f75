// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the reasoning-engine platform API.
//!
//! Provides [`EngineClient`] which opens streaming `:streamQuery` requests
//! and lists deployed engines for the registry's directory source.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use sluice_core::SluiceError;
use tracing::debug;

/// Maximum characters of an upstream error body carried into an error event.
const ERROR_BODY_LIMIT: usize = 500;

/// Client for the platform's reasoning-engine endpoints.
///
/// Timeouts around the streamed body are owned by the relay state machine;
/// the client only bounds connection establishment.
#[derive(Debug, Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    base_url: String,
    project: String,
    location: String,
}

impl EngineClient {
    /// Create a client for the given project and location.
    ///
    /// `base_url` overrides the platform endpoint; tests point it at a mock
    /// server. `api_token`, when set, is attached to every request as a
    /// bearer credential.
    pub fn new(
        project: String,
        location: String,
        base_url: Option<String>,
        api_token: Option<String>,
    ) -> Result<Self, SluiceError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if let Some(token) = api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| SluiceError::Config(format!("invalid engine api token: {e}")))?;
            headers.insert("authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SluiceError::Engine {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let base_url = base_url.unwrap_or_else(|| {
            format!("https://{location}-aiplatform.googleapis.com/v1")
        });

        Ok(Self {
            client,
            base_url,
            project,
            location,
        })
    }

    /// Open a streaming query against a deployed engine.
    ///
    /// Returns the raw response once headers arrive with a 200; the caller
    /// ingests the body incrementally. A non-200 is converted into an
    /// [`SluiceError::Engine`] carrying the truncated upstream body.
    pub async fn stream_query(
        &self,
        engine_id: &str,
        message: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<reqwest::Response, SluiceError> {
        let url = format!(
            "{}/projects/{}/locations/{}/reasoningEngines/{}:streamQuery",
            self.base_url, self.project, self.location, engine_id
        );

        let mut input = json!({
            "message": message,
            "user_id": user_id,
        });
        // Session continuity is opportunistic: the engine may ignore this
        // and allocate a fresh session.
        if let Some(session) = session_id {
            input["session_id"] = json!(session);
        }

        let response = self
            .client
            .post(&url)
            .json(&json!({ "input": input }))
            .send()
            .await
            .map_err(|e| SluiceError::Engine {
                message: format!("engine request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(%status, engine_id, "stream query dispatched");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(SluiceError::Engine {
                message: format!("agent query failed with {status}: {truncated}"),
                source: None,
            });
        }

        Ok(response)
    }

    /// List deployed reasoning engines for this project and location.
    ///
    /// Feeds the registry's platform directory source. The response carries
    /// `{"reasoningEngines": [{"name", "displayName", "description"}]}` where
    /// the engine id is the final path segment of `name`.
    pub async fn list_engines(&self) -> Result<Vec<EngineListing>, SluiceError> {
        let url = format!(
            "{}/projects/{}/locations/{}/reasoningEngines",
            self.base_url, self.project, self.location
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SluiceError::Engine {
                message: format!("engine listing failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(SluiceError::Engine {
                message: format!("engine listing failed with {status}: {truncated}"),
                source: None,
            });
        }

        let listing: ListEnginesResponse =
            response.json().await.map_err(|e| SluiceError::Engine {
                message: format!("engine listing unparseable: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(listing.reasoning_engines)
    }
}

/// One entry of the platform's engine directory.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineListing {
    /// Full resource name; the engine id is the final path segment.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

impl EngineListing {
    /// The bare engine id.
    pub fn engine_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEnginesResponse {
    #[serde(default)]
    reasoning_engines: Vec<EngineListing>,
}
