// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The relayed query endpoints.
//!
//! POST /query/stream forwards relay events live as Server-Sent Events, one
//! JSON object per event:
//!
//! ```text
//! data: {"text": "partial answer"}
//!
//! data: {"query_id": "...", "done": true}
//! ```
//!
//! POST /query drives the same relay internally and buffers the result into
//! a single JSON response for callers that cannot consume a stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use sluice_core::{AgentDescriptor, Claims, RecordSink};
use sluice_engine::{RelayEvent, run_relay};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for both query endpoints.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The user's message.
    pub message: String,
    /// Logical agent name to route to.
    pub agent_name: String,
    /// Optional upstream session for conversational context. Forwarded
    /// opportunistically; the engine may ignore it.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Build the relay event stream for one authenticated query.
///
/// Authorization happened in middleware; from here on everything -- agent
/// resolution failures included -- is reported in-band because the caller
/// may already be holding a committed stream.
fn relay_stream(
    state: &GatewayState,
    claims: &Claims,
    agent: Option<AgentDescriptor>,
    body: QueryRequest,
) -> impl Stream<Item = RelayEvent> + Send + use<> {
    let sink: Arc<dyn RecordSink> = Arc::clone(&state.history) as Arc<dyn RecordSink>;
    run_relay(
        state.engine.clone(),
        agent,
        body.message,
        claims.sub.clone(),
        body.session_id,
        sink,
        state.timeouts,
    )
}

/// POST /query/stream
pub async fn query_stream(
    State(state): State<GatewayState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<QueryRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let agent = state.registry.resolve(&body.agent_name).await.ok();
    let events = relay_stream(&state, &claims, agent, body);
    Sse::new(events.map(|event| Ok(Event::default().data(event.to_json().to_string()))))
}

/// Response body for POST /query.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub agent_name: String,
    pub user_id: String,
    pub query_id: Option<String>,
}

/// POST /query
///
/// Unlike the streaming endpoint the response is not yet committed when the
/// relay fails, so terminal errors surface as a plain HTTP error here.
pub async fn query_buffered(
    State(state): State<GatewayState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let agent_name = body.agent_name.clone();
    let agent = state.registry.resolve(&body.agent_name).await.ok();
    let mut events = std::pin::pin!(relay_stream(&state, &claims, agent, body));

    let mut response = String::new();
    let mut query_id = None;
    while let Some(event) = events.next().await {
        match event {
            RelayEvent::Text(text) => response.push_str(&text),
            RelayEvent::Error(message) => {
                return Err(ApiError::new(StatusCode::BAD_GATEWAY, message));
            }
            RelayEvent::Done { query_id: id, .. } => {
                query_id = id;
                break;
            }
        }
    }

    Ok(Json(QueryResponse {
        response,
        agent_name,
        user_id: claims.sub,
        query_id,
    }))
}
