//! Alert Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::dto::{AgentFilterQuery, AlertEntryResponse};
use crate::error::{ApiResult, ErrorResponse};
use crate::extractors::parse_agent_filter;
use crate::state::AppState;

/// Alerts returned by the listing endpoint
pub const ALERT_LIST_LIMIT: i64 = 50;

/// List recent alerts
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    tag = "Alerts",
    params(AgentFilterQuery),
    responses(
        (status = 200, description = "Latest alerts, newest first", body = Vec<AlertEntryResponse>),
        (status = 400, description = "Invalid agentId", body = ErrorResponse)
    )
)]
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AgentFilterQuery>,
) -> ApiResult<Json<Vec<AlertEntryResponse>>> {
    let agent = parse_agent_filter(query.agent_id.as_deref())?;
    let alerts = state.store.list_alerts(agent, ALERT_LIST_LIMIT).await?;

    Ok(Json(alerts.into_iter().map(Into::into).collect()))
}
