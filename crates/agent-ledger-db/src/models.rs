//! Database models - mapped from PostgreSQL tables

use agent_ledger_types::{
    ActionEntry, ActionLog, ActionMetadata, Agent, Alert, AlertEntry,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::DbError;

// ============================================================================
// Agent Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAgent {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub owner_id: String,
    pub status: String,
    pub monthly_budget: Decimal,
    pub per_action_limit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAgent> for Agent {
    type Error = DbError;

    fn try_from(row: DbAgent) -> Result<Self, Self::Error> {
        Ok(Agent {
            id: row.id.into(),
            status: row
                .status
                .parse()
                .map_err(|e| DbError::Corrupt(format!("agent {}: {}", row.id, e)))?,
            name: row.name,
            role: row.role,
            owner_id: row.owner_id,
            monthly_budget: row.monthly_budget,
            per_action_limit: row.per_action_limit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ============================================================================
// Action Log Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbActionLog {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub action_type: String,
    pub target: String,
    pub cost: Decimal,
    pub outcome: String,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbActionLog> for ActionLog {
    type Error = DbError;

    fn try_from(row: DbActionLog) -> Result<Self, Self::Error> {
        Ok(ActionLog {
            id: row.id.into(),
            agent_id: row.agent_id.into(),
            outcome: row
                .outcome
                .parse()
                .map_err(|e| DbError::Corrupt(format!("action {}: {}", row.id, e)))?,
            action_type: row.action_type,
            target: row.target,
            cost: row.cost,
            metadata: row.metadata.map(ActionMetadata),
            created_at: row.created_at,
        })
    }
}

/// Action row joined with `agents.name`
#[derive(Debug, Clone, FromRow)]
pub struct DbActionEntry {
    #[sqlx(flatten)]
    pub action: DbActionLog,
    pub agent_name: String,
}

impl TryFrom<DbActionEntry> for ActionEntry {
    type Error = DbError;

    fn try_from(row: DbActionEntry) -> Result<Self, Self::Error> {
        Ok(ActionEntry {
            action: row.action.try_into()?,
            agent_name: row.agent_name,
        })
    }
}

// ============================================================================
// Alert Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAlert {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub alert_type: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbAlert> for Alert {
    type Error = DbError;

    fn try_from(row: DbAlert) -> Result<Self, Self::Error> {
        Ok(Alert {
            id: row.id.into(),
            agent_id: row.agent_id.into(),
            kind: row
                .alert_type
                .parse()
                .map_err(|e| DbError::Corrupt(format!("alert {}: {}", row.id, e)))?,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

/// Alert row joined with `agents.name`
#[derive(Debug, Clone, FromRow)]
pub struct DbAlertEntry {
    #[sqlx(flatten)]
    pub alert: DbAlert,
    pub agent_name: String,
}

impl TryFrom<DbAlertEntry> for AlertEntry {
    type Error = DbError;

    fn try_from(row: DbAlertEntry) -> Result<Self, Self::Error> {
        Ok(AlertEntry {
            alert: row.alert.try_into()?,
            agent_name: row.agent_name,
        })
    }
}

/// Map a batch of rows, failing on the first corrupt one
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DbError>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_ledger_types::{ActionOutcome, AgentStatus};
    use rust_decimal_macros::dec;

    fn agent_row(status: &str) -> DbAgent {
        DbAgent {
            id: Uuid::new_v4(),
            name: "Research Assistant".to_string(),
            role: "Data analysis".to_string(),
            owner_id: "user_001".to_string(),
            status: status.to_string(),
            monthly_budget: dec!(50.00),
            per_action_limit: dec!(2.00),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_agent_row_conversion() {
        let row = agent_row("paused");
        let id = row.id;
        let agent = Agent::try_from(row).unwrap();
        assert_eq!(agent.id.0, id);
        assert_eq!(agent.status, AgentStatus::Paused);
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        assert!(matches!(Agent::try_from(agent_row("archived")), Err(DbError::Corrupt(_))));
    }

    #[test]
    fn test_action_row_keeps_metadata_verbatim() {
        let row = DbActionLog {
            id: Uuid::new_v4(),
            agent_id: Uuid::new_v4(),
            action_type: "api_call".to_string(),
            target: "anthropic:claude-3".to_string(),
            cost: dec!(0.18),
            outcome: "failure".to_string(),
            metadata: Some(r#"{"error": "rate_limit"}"#.to_string()),
            created_at: Utc::now(),
        };
        let action = ActionLog::try_from(row).unwrap();
        assert_eq!(action.outcome, ActionOutcome::Failure);
        assert_eq!(action.metadata.unwrap().as_str(), r#"{"error": "rate_limit"}"#);
    }
}
