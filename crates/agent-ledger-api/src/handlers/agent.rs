//! Agent Handlers
//!
//! Registry endpoints plus the administrative reset.

use agent_ledger_types::{AgentSpend, NewAgent};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::dto::{
    AgentDetail, AgentResponse, AgentSummary, CreateAgentRequest, SuccessResponse,
    UpdateAgentRequest,
};
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::extractors::{AgentPath, ValidatedJson};
use crate::state::AppState;

/// Alerts embedded per agent in the listing
pub const SUMMARY_ALERT_LIMIT: i64 = 5;
/// Actions embedded in the detail view
pub const DETAIL_ACTION_LIMIT: i64 = 100;
/// Alerts embedded in the detail view
pub const DETAIL_ALERT_LIMIT: i64 = 10;

/// List agents
#[utoipa::path(
    get,
    path = "/api/v1/agents",
    tag = "Agents",
    responses(
        (status = 200, description = "All agents, newest first", body = Vec<AgentSummary>)
    )
)]
pub async fn list_agents(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AgentSummary>>> {
    let window = state.clock.current_window();
    let agents = state.store.list_agents().await?;

    let mut summaries = Vec::with_capacity(agents.len());
    for agent in agents {
        let spent = state.store.month_spend(agent.id, window).await?;
        let alerts = state
            .store
            .list_alerts(Some(agent.id), SUMMARY_ALERT_LIMIT)
            .await?
            .into_iter()
            .map(|entry| entry.alert.into())
            .collect();
        let spend = AgentSpend::compute(&agent, spent);
        summaries.push(AgentSummary::new(agent, spend, alerts));
    }

    Ok(Json(summaries))
}

/// Create an agent
#[utoipa::path(
    post,
    path = "/api/v1/agents",
    tag = "Agents",
    request_body = CreateAgentRequest,
    responses(
        (status = 201, description = "Agent created", body = AgentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_agent(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateAgentRequest>,
) -> ApiResult<(StatusCode, Json<AgentResponse>)> {
    let input = NewAgent::from(request);
    input.validate()?;

    let agent = state.store.create_agent(input, state.clock.now()).await?;
    tracing::info!(agent_id = %agent.id, name = %agent.name, "Agent created");

    Ok((StatusCode::CREATED, Json(agent.into())))
}

/// Get an agent with spend, recent actions and alerts
#[utoipa::path(
    get,
    path = "/api/v1/agents/{id}",
    tag = "Agents",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent detail", body = AgentDetail),
        (status = 404, description = "Agent not found", body = ErrorResponse)
    )
)]
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    AgentPath(id): AgentPath,
) -> ApiResult<Json<AgentDetail>> {
    let agent = state
        .store
        .find_agent(id)
        .await?
        .ok_or(ApiError::AgentNotFound)?;

    // Spend comes from the full window, not from the truncated action list
    let spent = state.store.month_spend(id, state.clock.current_window()).await?;
    let actions = state.store.list_actions(Some(id), DETAIL_ACTION_LIMIT).await?;
    let alerts = state.store.list_alerts(Some(id), DETAIL_ALERT_LIMIT).await?;
    let spend = AgentSpend::compute(&agent, spent);

    Ok(Json(AgentDetail {
        agent: agent.into(),
        monthly_spend: spend.monthly_spend,
        budget_remaining: spend.budget_remaining,
        actions: actions.into_iter().map(|entry| entry.action.into()).collect(),
        alerts: alerts.into_iter().map(|entry| entry.alert.into()).collect(),
    }))
}

/// Update an agent
#[utoipa::path(
    patch,
    path = "/api/v1/agents/{id}",
    tag = "Agents",
    params(("id" = String, Path, description = "Agent id")),
    request_body = UpdateAgentRequest,
    responses(
        (status = 200, description = "Agent updated", body = AgentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Agent not found", body = ErrorResponse)
    )
)]
pub async fn update_agent(
    State(state): State<Arc<AppState>>,
    AgentPath(id): AgentPath,
    ValidatedJson(request): ValidatedJson<UpdateAgentRequest>,
) -> ApiResult<Json<AgentResponse>> {
    let agent = state
        .store
        .update_agent(id, request.into(), state.clock.now())
        .await?;
    tracing::info!(agent_id = %id, status = %agent.status, "Agent updated");

    Ok(Json(agent.into()))
}

/// Reset an agent
///
/// Reactivates the agent and deletes all of its actions and alerts.
#[utoipa::path(
    post,
    path = "/api/v1/agents/{id}/reset",
    tag = "Agents",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent reset", body = SuccessResponse),
        (status = 404, description = "Agent not found", body = ErrorResponse)
    )
)]
pub async fn reset_agent(
    State(state): State<Arc<AppState>>,
    AgentPath(id): AgentPath,
) -> ApiResult<Json<SuccessResponse>> {
    state.store.reset_agent(id, state.clock.now()).await?;
    metrics::counter!("agent_ledger_resets_total").increment(1);
    tracing::info!(agent_id = %id, "Agent reset");

    Ok(Json(SuccessResponse::ok()))
}
