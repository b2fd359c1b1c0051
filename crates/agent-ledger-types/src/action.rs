//! Action log records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::identity::{ActionId, AgentId};
use crate::money::check_amount;

/// Result reported by the agent for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionOutcome {
    Success,
    Failure,
}

impl ActionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionOutcome {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            other => Err(LedgerError::UnknownOutcome(other.to_string())),
        }
    }
}

/// Caller-supplied payload attached to an action. Stored and returned
/// verbatim, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionMetadata(pub String);

impl ActionMetadata {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ActionMetadata {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// A persisted action. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLog {
    pub id: ActionId,
    pub agent_id: AgentId,
    pub action_type: String,
    pub target: String,
    pub cost: Decimal,
    pub outcome: ActionOutcome,
    pub metadata: Option<ActionMetadata>,
    pub created_at: DateTime<Utc>,
}

/// A proposed action, as submitted by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAction {
    pub agent_id: AgentId,
    pub action_type: String,
    pub target: String,
    pub cost: Decimal,
    pub outcome: ActionOutcome,
    #[serde(default)]
    pub metadata: Option<ActionMetadata>,
}

impl NewAction {
    pub fn validate(&self) -> Result<()> {
        if self.cost < Decimal::ZERO {
            return Err(LedgerError::NegativeCost(self.cost));
        }
        check_amount("cost", self.cost)
    }

    /// Materialise the row a store will insert
    pub fn into_log(self, created_at: DateTime<Utc>) -> ActionLog {
        ActionLog {
            id: ActionId::new(),
            agent_id: self.agent_id,
            action_type: self.action_type,
            target: self.target,
            cost: self.cost,
            outcome: self.outcome,
            metadata: self.metadata,
            created_at,
        }
    }
}

/// An action joined with the name of its agent, for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEntry {
    #[serde(flatten)]
    pub action: ActionLog,
    pub agent_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn proposal(cost: Decimal) -> NewAction {
        NewAction {
            agent_id: AgentId::new(),
            action_type: "api_call".to_string(),
            target: "openai:gpt-4".to_string(),
            cost,
            outcome: ActionOutcome::Success,
            metadata: Some(ActionMetadata::new(r#"{"tokens": 2500}"#)),
        }
    }

    #[test]
    fn test_negative_cost_rejected() {
        assert_eq!(
            proposal(dec!(-0.01)).validate(),
            Err(LedgerError::NegativeCost(dec!(-0.01)))
        );
        assert!(proposal(Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn test_cost_must_fit_storage() {
        assert!(matches!(
            proposal(dec!(0.0000004)).validate(),
            Err(LedgerError::TooPrecise { field: "cost", .. })
        ));
        assert!(matches!(
            proposal(Decimal::MAX).validate(),
            Err(LedgerError::AmountOutOfRange { field: "cost", .. })
        ));
        assert!(proposal(dec!(0.000001)).validate().is_ok());
    }

    #[test]
    fn test_into_log_keeps_submission() {
        let input = proposal(dec!(0.15));
        let now = Utc::now();
        let log = input.clone().into_log(now);
        assert_eq!(log.agent_id, input.agent_id);
        assert_eq!(log.cost, dec!(0.15));
        assert_eq!(log.metadata, input.metadata);
        assert_eq!(log.created_at, now);
    }

    #[test]
    fn test_metadata_is_passed_through_as_text() {
        let json = r#"{"agentId":"6f1c2b9e-1d4a-4a43-9a43-1b7f2f0f6a11","actionType":"web_search","target":"tavily:search","cost":"0.01","outcome":"success","metadata":"not json at all"}"#;
        let input: NewAction = serde_json::from_str(json).unwrap();
        assert_eq!(input.metadata.unwrap().as_str(), "not json at all");
        assert_eq!(input.cost, dec!(0.01));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!("failure".parse::<ActionOutcome>().unwrap(), ActionOutcome::Failure);
        assert!("timeout".parse::<ActionOutcome>().is_err());
    }
}
