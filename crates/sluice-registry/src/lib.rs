// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent registry: a read-mostly TTL cache over a directory source.
//!
//! The cache is an explicit `(agents, fetched_at)` pair swapped atomically.
//! Concurrent refreshes race benignly (single-writer-wins: the last store
//! overwrites) and stale reads during a refresh are acceptable. A directory
//! failure never reaches the caller -- the last good cache, or an empty
//! list, is always preferable to a broken listing endpoint.

pub mod clock;
pub mod directory;

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use sluice_core::{AgentDescriptor, SluiceError};
use tracing::{debug, warn};

pub use clock::{Clock, SystemClock};
pub use directory::{DirectorySource, PlatformDirectory, StaticDirectory};

struct CacheEntry {
    agents: Vec<AgentDescriptor>,
    fetched_at: Instant,
}

/// Caching view over a [`DirectorySource`].
pub struct AgentRegistry {
    source: Arc<dyn DirectorySource>,
    cache: ArcSwapOption<CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl AgentRegistry {
    pub fn new(source: Arc<dyn DirectorySource>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: ArcSwapOption::empty(),
            ttl,
            clock,
        }
    }

    /// List known agents, serving from cache until the TTL lapses or a
    /// refresh is forced. Never errors: on directory failure the last good
    /// cache (or an empty list) is returned.
    pub async fn list(&self, force_refresh: bool) -> Vec<AgentDescriptor> {
        if !force_refresh
            && let Some(entry) = self.cache.load_full()
            && self.clock.now().duration_since(entry.fetched_at) < self.ttl
        {
            return entry.agents.clone();
        }

        match self.source.fetch().await {
            Ok(agents) => {
                debug!(count = agents.len(), "agent directory refreshed");
                self.cache.store(Some(Arc::new(CacheEntry {
                    agents: agents.clone(),
                    fetched_at: self.clock.now(),
                })));
                agents
            }
            Err(e) => {
                warn!(error = %e, "agent directory refresh failed, serving last good cache");
                self.cache
                    .load_full()
                    .map(|entry| entry.agents.clone())
                    .unwrap_or_default()
            }
        }
    }

    /// Resolve one agent by logical name.
    pub async fn resolve(&self, name: &str) -> Result<AgentDescriptor, SluiceError> {
        self.list(false)
            .await
            .into_iter()
            .find(|agent| agent.name == name)
            .ok_or_else(|| SluiceError::not_found("agent", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted directory source: pops one prepared response per fetch.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<AgentDescriptor>, SluiceError>>>,
        fetches: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<AgentDescriptor>, SluiceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl DirectorySource for ScriptedSource {
        async fn fetch(&self) -> Result<Vec<AgentDescriptor>, SluiceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn agent(name: &str) -> AgentDescriptor {
        AgentDescriptor {
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            engine_id: "1".to_string(),
        }
    }

    fn registry_with(
        source: Arc<ScriptedSource>,
        clock: Arc<ManualClock>,
    ) -> AgentRegistry {
        AgentRegistry::new(source, Duration::from_secs(300), clock)
    }

    #[tokio::test]
    async fn cache_serves_until_ttl_expires() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(vec![agent("a")]),
            Ok(vec![agent("b")]),
        ]));
        let clock = Arc::new(ManualClock::new());
        let registry = registry_with(Arc::clone(&source), Arc::clone(&clock));

        assert_eq!(registry.list(false).await[0].name, "a");
        // Within TTL: cached, no second fetch.
        clock.advance(Duration::from_secs(299));
        assert_eq!(registry.list(false).await[0].name, "a");
        assert_eq!(source.fetch_count(), 1);

        // Past TTL: refetched.
        clock.advance(Duration::from_secs(2));
        assert_eq!(registry.list(false).await[0].name, "b");
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_a_fresh_cache() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(vec![agent("a")]),
            Ok(vec![agent("b")]),
        ]));
        let clock = Arc::new(ManualClock::new());
        let registry = registry_with(Arc::clone(&source), clock);

        registry.list(false).await;
        assert_eq!(registry.list(true).await[0].name, "b");
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn directory_failure_serves_last_good_cache() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(vec![agent("a")]),
            Err(SluiceError::Engine {
                message: "directory down".into(),
                source: None,
            }),
        ]));
        let clock = Arc::new(ManualClock::new());
        let registry = registry_with(Arc::clone(&source), Arc::clone(&clock));

        registry.list(false).await;
        clock.advance(Duration::from_secs(301));
        let agents = registry.list(false).await;
        assert_eq!(agents[0].name, "a", "stale cache beats an error");
    }

    #[tokio::test]
    async fn directory_failure_with_no_cache_serves_empty() {
        let source = Arc::new(ScriptedSource::new(vec![Err(SluiceError::Engine {
            message: "directory down".into(),
            source: None,
        })]));
        let clock = Arc::new(ManualClock::new());
        let registry = registry_with(source, clock);

        assert!(registry.list(false).await.is_empty());
    }

    #[tokio::test]
    async fn resolve_finds_by_logical_name() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(vec![
            agent("bq_agent"),
            agent("other"),
        ])]));
        let clock = Arc::new(ManualClock::new());
        let registry = registry_with(source, clock);

        let resolved = registry.resolve("other").await.unwrap();
        assert_eq!(resolved.name, "other");

        let err = registry.resolve("missing").await.unwrap_err();
        assert!(matches!(err, SluiceError::NotFound { .. }));
    }
}
