//! Action DTOs

use agent_ledger_types::{
    ActionEntry, ActionLog, ActionMetadata, ActionOutcome, AgentId, NewAction,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::AgentNameRef;

/// Submit an action for spend checking and logging
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitActionRequest {
    /// Agent performing the action (bare UUID or `agent_` prefixed)
    #[validate(length(min = 1, message = "agentId is required"))]
    pub agent_id: String,
    /// Action category, e.g. `api_call`
    #[validate(length(min = 1, max = 100, message = "actionType must be 1-100 characters"))]
    pub action_type: String,
    /// What the action was aimed at, e.g. `openai:gpt-4`
    #[validate(length(min = 1, max = 500, message = "target must be 1-500 characters"))]
    pub target: String,
    /// Cost in dollars, string or number
    #[schema(value_type = String, example = "0.15")]
    pub cost: Decimal,
    #[schema(value_type = String, example = "success")]
    pub outcome: ActionOutcome,
    /// Opaque payload, stored verbatim
    #[serde(default)]
    pub metadata: Option<String>,
}

impl SubmitActionRequest {
    /// Build the domain proposal once the agent id is resolved
    pub fn into_new_action(self, agent_id: AgentId) -> NewAction {
        NewAction {
            agent_id,
            action_type: self.action_type,
            target: self.target,
            cost: self.cost,
            outcome: self.outcome,
            metadata: self.metadata.map(ActionMetadata),
        }
    }
}

/// A logged action
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub action_type: String,
    pub target: String,
    #[schema(value_type = String, example = "0.15")]
    pub cost: Decimal,
    #[schema(value_type = String, example = "success")]
    pub outcome: ActionOutcome,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActionLog> for ActionResponse {
    fn from(log: ActionLog) -> Self {
        Self {
            id: log.id.0,
            agent_id: log.agent_id.0,
            action_type: log.action_type,
            target: log.target,
            cost: log.cost,
            outcome: log.outcome,
            metadata: log.metadata.map(|m| m.0),
            created_at: log.created_at,
        }
    }
}

/// A logged action with the name of its agent
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActionEntryResponse {
    #[serde(flatten)]
    pub action: ActionResponse,
    pub agent: AgentNameRef,
}

impl From<ActionEntry> for ActionEntryResponse {
    fn from(entry: ActionEntry) -> Self {
        Self {
            action: entry.action.into(),
            agent: AgentNameRef { name: entry.agent_name },
        }
    }
}
