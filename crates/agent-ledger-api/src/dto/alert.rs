//! Alert DTOs

use agent_ledger_types::{Alert, AlertEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::AgentNameRef;

/// An alert
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub id: Uuid,
    pub agent_id: Uuid,
    /// Alert category, e.g. `budget_exceeded`
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<Alert> for AlertResponse {
    fn from(alert: Alert) -> Self {
        Self {
            id: alert.id.0,
            agent_id: alert.agent_id.0,
            alert_type: alert.kind.as_str().to_string(),
            message: alert.message,
            created_at: alert.created_at,
        }
    }
}

/// An alert with the name of its agent
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlertEntryResponse {
    #[serde(flatten)]
    pub alert: AlertResponse,
    pub agent: AgentNameRef,
}

impl From<AlertEntry> for AlertEntryResponse {
    fn from(entry: AlertEntry) -> Self {
        Self {
            alert: entry.alert.into(),
            agent: AgentNameRef { name: entry.agent_name },
        }
    }
}
