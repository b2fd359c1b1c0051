//! Alerts raised when an agent is auto-paused

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::identity::{AgentId, AlertId};

/// Alert category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    BudgetExceeded,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BudgetExceeded => "budget_exceeded",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "budget_exceeded" => Ok(Self::BudgetExceeded),
            other => Err(LedgerError::UnknownAlertKind(other.to_string())),
        }
    }
}

/// A persisted alert. Never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub agent_id: AgentId,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        agent_id: AgentId,
        kind: AlertKind,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            agent_id,
            kind,
            message: message.into(),
            created_at,
        }
    }
}

/// An alert joined with the name of its agent, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEntry {
    #[serde(flatten)]
    pub alert: Alert,
    pub agent_name: String,
}
