// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for everything except the relayed query endpoints.

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use sluice_core::Claims;
use tracing::error;

use crate::auth::history_scope;
use crate::error::ApiError;
use crate::server::GatewayState;

/// Default number of history records returned when the caller names none.
const DEFAULT_HISTORY_LIMIT: usize = 50;

// --- Service metadata ---

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub agents: Vec<String>,
}

/// GET /
///
/// Service banner: name, version, and the known agent names.
pub async fn root(State(state): State<GatewayState>) -> Json<RootResponse> {
    let agents = state.registry.list(false).await;
    Json(RootResponse {
        name: "Sluice Relay".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        agents: agents.into_iter().map(|a| a.name).collect(),
    })
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub project: String,
    pub location: String,
}

/// GET /health
pub async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        project: state.project.clone(),
        location: state.location.clone(),
    })
}

// --- Agents ---

#[derive(Debug, Deserialize)]
pub struct AgentsParams {
    #[serde(default)]
    pub force_refresh: bool,
}

/// One agent as listed to callers. The engine id stays internal.
#[derive(Debug, Serialize)]
pub struct AgentInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub is_available: bool,
}

/// GET /agents
///
/// Unauthenticated by design; the listing carries nothing sensitive.
pub async fn list_agents(
    State(state): State<GatewayState>,
    Query(params): Query<AgentsParams>,
) -> Json<Vec<AgentInfo>> {
    let agents = state.registry.list(params.force_refresh).await;
    Json(
        agents
            .into_iter()
            .map(|agent| AgentInfo {
                is_available: agent.is_available(),
                name: agent.name,
                display_name: agent.display_name,
                description: agent.description,
            })
            .collect(),
    )
}

// --- Accounts ---

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: String,
    pub email: String,
    pub created_at: String,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<GatewayState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let user = state
        .accounts
        .create_account(&body.email, &body.password)
        .await?;
    Ok(Json(SignupResponse {
        user_id: user.user_id,
        email: user.email,
        created_at: user.created_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
}

/// POST /auth/login
///
/// A single 401 covers unknown email, wrong password, and deactivated
/// account alike.
pub async fn login(
    State(state): State<GatewayState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(user) = state
        .accounts
        .authenticate(&body.email, &body.password)
        .await?
    else {
        return Err(ApiError::unauthorized("invalid email or password"));
    };

    let access_token = state.accounts.issue_token(&user)?;
    Ok(Json(LoginResponse {
        access_token,
        user_id: user.user_id,
        email: user.email,
    }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub created_at: String,
}

/// GET /auth/me
pub async fn me(
    State(state): State<GatewayState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeResponse>, ApiError> {
    let Some(user) = state.accounts.current_user(&claims).await? else {
        return Err(ApiError::not_found("user not found"));
    };
    Ok(Json(MeResponse {
        user_id: user.user_id,
        email: user.email,
        created_at: user.created_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// DELETE /auth/me
///
/// Soft delete; the flag reports whether this call flipped the account.
pub async fn delete_me(
    State(state): State<GatewayState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let success = state.accounts.deactivate(&claims.sub).await?;
    Ok(Json(DeleteResponse { success }))
}

// --- History ---

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: String,
    pub user_id: String,
    pub agent_name: String,
    pub message: String,
    pub response: String,
    pub timestamp: String,
}

/// GET /history
///
/// Never a 5xx: a store failure degrades to an empty list so a UI that
/// treats history as optional keeps working.
pub async fn list_history(
    State(state): State<GatewayState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryItem>>, ApiError> {
    let user_id = history_scope(&claims, params.user_id.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    let records = match state.history.list(&user_id, limit).await {
        Ok(records) => records,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "history read failed, returning empty list");
            Vec::new()
        }
    };

    Ok(Json(
        records
            .into_iter()
            .map(|r| HistoryItem {
                id: r.id,
                user_id: r.user_id,
                agent_name: r.agent_name,
                message: r.message,
                response: r.response,
                timestamp: r.created_at,
            })
            .collect(),
    ))
}

/// DELETE /history/{id}
///
/// 404 covers both a missing record and one owned by someone else; the
/// caller cannot tell which.
pub async fn delete_history_item(
    State(state): State<GatewayState>,
    Extension(claims): Extension<Claims>,
    Path(record_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let user_id = history_scope(&claims, params.user_id.as_deref())?;
    if !state.history.delete_one(&record_id, &user_id).await? {
        return Err(ApiError::not_found("query not found"));
    }
    Ok(Json(DeleteResponse { success: true }))
}

#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    pub success: bool,
    pub deleted_count: usize,
}

/// DELETE /history
pub async fn delete_all_history(
    State(state): State<GatewayState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<DeleteAllResponse>, ApiError> {
    let user_id = history_scope(&claims, params.user_id.as_deref())?;
    let deleted_count = state.history.delete_all(&user_id).await?;
    Ok(Json(DeleteAllResponse {
        success: true,
        deleted_count,
    }))
}
