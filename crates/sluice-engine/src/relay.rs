// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-query relay state machine.
//!
//! Resolve -> Dispatch -> Ingest -> Emit -> Finalize. Each query runs one
//! fresh instance; a terminated relay never resumes. The returned stream is
//! guaranteed to end with a terminal event (`Error` or `Done`) for every
//! request that reaches dispatch, no matter how the upstream behaves.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde_json::{Value, json};
use sluice_core::{AgentDescriptor, RecordSink};
use tokio::time::{Instant, timeout};
use tracing::{debug, error, warn};

use crate::client::EngineClient;
use crate::frames::extract_text;

/// One event emitted to the caller of a relayed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// A live text increment, forwarded in extraction order.
    Text(String),
    /// Terminal failure. Carries the `done` marker on the wire; nothing
    /// follows it.
    Error(String),
    /// Terminal success (or empty completion). Nothing follows it.
    Done {
        /// Persisted record id, when the exchange was saved.
        query_id: Option<String>,
        /// Set when the upstream produced no text; nothing was persisted.
        warning: Option<String>,
        /// Set when persistence failed; the answer itself still stands.
        save_error: Option<String>,
    },
}

impl RelayEvent {
    /// Wire shape: one JSON object per event.
    pub fn to_json(&self) -> Value {
        match self {
            RelayEvent::Text(text) => json!({ "text": text }),
            RelayEvent::Error(message) => json!({ "error": message, "done": true }),
            RelayEvent::Done {
                query_id,
                warning,
                save_error,
            } => {
                let mut obj = json!({ "done": true });
                if let Some(id) = query_id {
                    obj["query_id"] = json!(id);
                }
                if let Some(w) = warning {
                    obj["warning"] = json!(w);
                }
                if let Some(e) = save_error {
                    obj["save_error"] = json!(e);
                }
                obj
            }
        }
    }

    /// True for events after which the stream ends.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RelayEvent::Error(_) | RelayEvent::Done { .. })
    }
}

/// Deadlines enforced independently during one relayed query.
#[derive(Debug, Clone, Copy)]
pub struct RelayTimeouts {
    /// Bound on the entire relay lifetime, dispatch included.
    pub overall: Duration,
    /// Bound on the gap between upstream chunks.
    pub idle: Duration,
}

impl Default for RelayTimeouts {
    fn default() -> Self {
        Self {
            overall: Duration::from_secs(180),
            idle: Duration::from_secs(30),
        }
    }
}

/// Run one query through the relay state machine.
///
/// `agent` is the registry's resolution result; `None` or an unavailable
/// descriptor terminates before any upstream work. Increments are yielded
/// in the exact order extracted. When the caller drops the stream early the
/// upstream connection is released with it and nothing is persisted.
pub fn run_relay(
    client: EngineClient,
    agent: Option<AgentDescriptor>,
    message: String,
    user_id: String,
    session_id: Option<String>,
    sink: Arc<dyn RecordSink>,
    timeouts: RelayTimeouts,
) -> impl Stream<Item = RelayEvent> + Send {
    stream! {
        // Resolve. No partial work on an unroutable agent.
        let Some(agent) = agent else {
            yield RelayEvent::Error("agent not found".to_string());
            return;
        };
        if !agent.is_available() {
            yield RelayEvent::Error(format!(
                "agent '{}' is not configured: no reasoning engine id",
                agent.name
            ));
            return;
        }

        let deadline = Instant::now() + timeouts.overall;

        // Dispatch, bounded by the overall deadline.
        let response = match timeout(
            timeouts.overall,
            client.stream_query(&agent.engine_id, &message, &user_id, session_id.as_deref()),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(agent = %agent.name, error = %e, "dispatch failed");
                yield RelayEvent::Error(e.to_string());
                return;
            }
            Err(_) => {
                warn!(agent = %agent.name, "dispatch timed out");
                yield RelayEvent::Error(format!(
                    "engine request timed out after {}s",
                    timeouts.overall.as_secs()
                ));
                return;
            }
        };

        // Ingest: newline-delimited frames, emitted as they decode. The raw
        // body is retained for the no-frames fallback.
        let mut body = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut raw: Vec<u8> = Vec::new();
        let mut increments: Vec<String> = Vec::new();
        let mut frames_seen = 0usize;

        'ingest: loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(agent = %agent.name, "overall timeout elapsed, truncating ingest");
                break 'ingest;
            }

            match timeout(remaining.min(timeouts.idle), body.next()).await {
                Err(_) => {
                    warn!(agent = %agent.name, "idle timeout elapsed, truncating ingest");
                    break 'ingest;
                }
                Ok(None) => break 'ingest,
                Ok(Some(Err(e))) => {
                    warn!(agent = %agent.name, error = %e, "upstream stream failed mid-body");
                    yield RelayEvent::Error(format!("engine stream failed: {e}"));
                    return;
                }
                Ok(Some(Ok(chunk))) => {
                    raw.extend_from_slice(&chunk);
                    pending.extend_from_slice(&chunk);
                    while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = pending.drain(..=pos).collect();
                        if let Some(texts) = decode_frame(&line[..line.len() - 1]) {
                            frames_seen += 1;
                            for text in texts {
                                increments.push(text.clone());
                                yield RelayEvent::Text(text);
                            }
                        }
                    }
                }
            }
        }

        // The body may not end with a newline; flush the tail as one frame.
        if let Some(texts) = decode_frame(&pending) {
            frames_seen += 1;
            for text in texts {
                increments.push(text.clone());
                yield RelayEvent::Text(text);
            }
        }

        // Degradation path: the framing is not contractually guaranteed.
        // With zero frames on the line channel, treat the whole body as one
        // unit -- a single JSON object, else raw text.
        if frames_seen == 0 && !raw.is_empty() {
            for text in decode_whole_body(&raw) {
                increments.push(text.clone());
                yield RelayEvent::Text(text);
            }
        }

        // Finalize.
        let final_text = increments.concat();
        if final_text.is_empty() {
            debug!(agent = %agent.name, "upstream produced no text, skipping persistence");
            yield RelayEvent::Done {
                query_id: None,
                warning: Some("empty response".to_string()),
                save_error: None,
            };
            return;
        }

        match sink.append(&user_id, &agent.name, &message, &final_text).await {
            Ok(query_id) => {
                yield RelayEvent::Done {
                    query_id: Some(query_id),
                    warning: None,
                    save_error: None,
                };
            }
            Err(e) => {
                // The user-visible exchange succeeded; storage failure is
                // advisory only.
                error!(agent = %agent.name, user_id = %user_id, error = %e, "failed to persist exchange");
                yield RelayEvent::Done {
                    query_id: None,
                    warning: None,
                    save_error: Some(e.to_string()),
                };
            }
        }
    }
}

/// Decode one line as a JSON frame and extract its text increments.
///
/// Returns `None` for blank and non-JSON lines (both skipped without
/// counting as frames) and `Some(texts)` for any parsed JSON value.
fn decode_frame(line: &[u8]) -> Option<Vec<String>> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }
    let frame: Value = serde_json::from_slice(line).ok()?;
    Some(extract_text(&frame))
}

/// Interpret the entire body as one unit: a single JSON value, else raw text.
fn decode_whole_body(raw: &[u8]) -> Vec<String> {
    if let Ok(frame) = serde_json::from_slice::<Value>(raw) {
        return extract_text(&frame);
    }
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.is_empty() {
        Vec::new()
    } else {
        vec![text.to_string()]
    }
}
