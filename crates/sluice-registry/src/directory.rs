// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory sources: where the registry learns which agents exist.
//!
//! The platform directory lists deployed reasoning engines over REST; the
//! static directory serves a fixed set from configuration. Both hide behind
//! [`DirectorySource`] so the cache does not care which one feeds it.

use async_trait::async_trait;
use sluice_core::{AgentDescriptor, SluiceError};
use sluice_engine::EngineClient;

/// An external service (or stand-in) that enumerates agents.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<AgentDescriptor>, SluiceError>;
}

/// Directory backed by the platform's reasoning-engine listing.
pub struct PlatformDirectory {
    client: EngineClient,
}

impl PlatformDirectory {
    pub fn new(client: EngineClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DirectorySource for PlatformDirectory {
    async fn fetch(&self) -> Result<Vec<AgentDescriptor>, SluiceError> {
        let engines = self.client.list_engines().await?;
        Ok(engines
            .into_iter()
            .map(|engine| {
                let engine_id = engine.engine_id().to_string();
                AgentDescriptor {
                    name: slugify(&engine.display_name),
                    display_name: engine.display_name,
                    description: engine.description,
                    engine_id,
                }
            })
            .collect())
    }
}

/// Directory serving a fixed set of descriptors from configuration.
pub struct StaticDirectory {
    agents: Vec<AgentDescriptor>,
}

impl StaticDirectory {
    pub fn new(agents: Vec<AgentDescriptor>) -> Self {
        Self { agents }
    }
}

#[async_trait]
impl DirectorySource for StaticDirectory {
    async fn fetch(&self) -> Result<Vec<AgentDescriptor>, SluiceError> {
        Ok(self.agents.clone())
    }
}

/// Derive a logical agent name from a display name: lowercase, runs of
/// non-alphanumerics collapse to single underscores.
fn slugify(display_name: &str) -> String {
    let mut slug = String::with_capacity(display_name.len());
    let mut last_was_sep = true;
    for c in display_name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("BigQuery Agent"), "bigquery_agent");
        assert_eq!(slugify("BigQuery Agent (Mick)"), "bigquery_agent_mick");
        assert_eq!(slugify("  spaced  "), "spaced");
    }

    #[tokio::test]
    async fn platform_directory_maps_listings_to_descriptors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reasoningEngines": [{
                    "name": "projects/p/locations/l/reasoningEngines/987",
                    "displayName": "BigQuery Agent",
                    "description": "billing analysis"
                }]
            })))
            .mount(&server)
            .await;

        let client = EngineClient::new(
            "demo-project".into(),
            "us-central1".into(),
            Some(server.uri()),
            None,
        )
        .unwrap();
        let directory = PlatformDirectory::new(client);
        let agents = directory.fetch().await.unwrap();

        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "bigquery_agent");
        assert_eq!(agents[0].engine_id, "987");
        assert!(agents[0].is_available());
    }

    #[tokio::test]
    async fn static_directory_serves_configured_agents() {
        let directory = StaticDirectory::new(vec![AgentDescriptor {
            name: "bq_agent".into(),
            display_name: "BigQuery Agent".into(),
            description: String::new(),
            engine_id: String::new(),
        }]);
        let agents = directory.fetch().await.unwrap();
        assert_eq!(agents.len(), 1);
        assert!(!agents[0].is_available());
    }
}
