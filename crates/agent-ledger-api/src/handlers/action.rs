//! Action Handlers
//!
//! Action submission is where spend enforcement happens: the request is
//! resolved to an agent, handed to the store together with the current
//! spend window, and the store's verdict is mapped onto HTTP.

use agent_ledger_db::Submission;
use agent_ledger_types::AgentId;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::dto::{ActionEntryResponse, ActionResponse, AgentFilterQuery, SubmitActionRequest};
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::extractors::{parse_agent_filter, ValidatedJson};
use crate::state::AppState;

/// Actions returned by the listing endpoint
pub const ACTION_LIST_LIMIT: i64 = 100;

/// Submit an action
///
/// Runs the spend rule. Crossing the monthly budget pauses the agent and
/// raises a `budget_exceeded` alert; the action itself is not logged.
#[utoipa::path(
    post,
    path = "/api/v1/actions",
    tag = "Actions",
    request_body = SubmitActionRequest,
    responses(
        (status = 201, description = "Action logged", body = ActionResponse),
        (status = 400, description = "Per-action limit exceeded or invalid input", body = ErrorResponse),
        (status = 403, description = "Agent paused or monthly budget exceeded", body = ErrorResponse),
        (status = 404, description = "Agent not found", body = ErrorResponse)
    )
)]
pub async fn submit_action(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SubmitActionRequest>,
) -> ApiResult<(StatusCode, Json<ActionResponse>)> {
    let agent_id = AgentId::parse(request.agent_id.trim()).map_err(|_| ApiError::AgentNotFound)?;
    let input = request.into_new_action(agent_id);
    input.validate()?;

    let submission = state
        .store
        .submit_action(input, state.clock.current_window(), state.clock.now())
        .await?;

    metrics::counter!("agent_ledger_actions_total", "result" => submission.label()).increment(1);

    match submission {
        Submission::Logged(log) => {
            tracing::debug!(agent_id = %agent_id, action_id = %log.id, cost = %log.cost, "Action logged");
            Ok((StatusCode::CREATED, Json(log.into())))
        }
        Submission::Rejected(reason) => {
            tracing::info!(agent_id = %agent_id, reason = %reason, "Action rejected");
            Err(reason.into())
        }
        Submission::Paused { reason, alert } => {
            metrics::counter!("agent_ledger_agents_paused_total").increment(1);
            tracing::warn!(agent_id = %agent_id, alert_id = %alert.id, message = %alert.message, "Agent auto-paused");
            Err(reason.into())
        }
    }
}

/// List recent actions
#[utoipa::path(
    get,
    path = "/api/v1/actions",
    tag = "Actions",
    params(AgentFilterQuery),
    responses(
        (status = 200, description = "Latest actions, newest first", body = Vec<ActionEntryResponse>),
        (status = 400, description = "Invalid agentId", body = ErrorResponse)
    )
)]
pub async fn list_actions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AgentFilterQuery>,
) -> ApiResult<Json<Vec<ActionEntryResponse>>> {
    let agent = parse_agent_filter(query.agent_id.as_deref())?;
    let actions = state.store.list_actions(agent, ACTION_LIST_LIMIT).await?;

    Ok(Json(actions.into_iter().map(Into::into).collect()))
}
