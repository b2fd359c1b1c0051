//! Agent records and their spending limits

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::identity::AgentId;
use crate::money::check_amount;

/// Whether an agent may currently spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Active,
    Paused,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            other => Err(LedgerError::UnknownStatus(other.to_string())),
        }
    }
}

/// A tracked agent with a monthly budget and a per-action ceiling.
///
/// `per_action_limit` is allowed to exceed `monthly_budget`; the two limits
/// are checked independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub owner_id: String,
    pub status: AgentStatus,
    pub monthly_budget: Decimal,
    pub per_action_limit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn is_paused(&self) -> bool {
        self.status == AgentStatus::Paused
    }

    /// The subset of the record the spend rule looks at
    pub fn limits(&self) -> SpendLimits {
        SpendLimits {
            status: self.status,
            monthly_budget: self.monthly_budget,
            per_action_limit: self.per_action_limit,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, update: &AgentUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(role) = update.role() {
            self.role = role.to_string();
        }
        if let Some(budget) = update.monthly_budget {
            self.monthly_budget = budget;
        }
        if let Some(limit) = update.per_action_limit {
            self.per_action_limit = limit;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

/// Limits and status of an agent, as consumed by the spend rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendLimits {
    pub status: AgentStatus,
    pub monthly_budget: Decimal,
    pub per_action_limit: Decimal,
}

/// Input for creating an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    pub role: String,
    pub owner_id: String,
    pub monthly_budget: Decimal,
    pub per_action_limit: Decimal,
    #[serde(default)]
    pub status: Option<AgentStatus>,
}

impl NewAgent {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::EmptyField("name"));
        }
        if self.owner_id.trim().is_empty() {
            return Err(LedgerError::EmptyField("ownerId"));
        }
        positive("monthlyBudget", self.monthly_budget)?;
        positive("perActionLimit", self.per_action_limit)
    }

    /// Materialise the record a store will insert
    pub fn into_agent(self, now: DateTime<Utc>) -> Agent {
        Agent {
            id: AgentId::new(),
            name: self.name,
            role: self.role,
            owner_id: self.owner_id,
            status: self.status.unwrap_or_default(),
            monthly_budget: self.monthly_budget,
            per_action_limit: self.per_action_limit,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an agent; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub monthly_budget: Option<Decimal>,
    #[serde(default)]
    pub per_action_limit: Option<Decimal>,
    #[serde(default)]
    pub status: Option<AgentStatus>,
}

impl AgentUpdate {
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(LedgerError::EmptyField("name"));
        }
        if let Some(budget) = self.monthly_budget {
            positive("monthlyBudget", budget)?;
        }
        if let Some(limit) = self.per_action_limit {
            positive("perActionLimit", limit)?;
        }
        Ok(())
    }

    /// The role to set; an empty string leaves the stored role alone
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref().filter(|role| !role.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.monthly_budget.is_none()
            && self.per_action_limit.is_none()
            && self.status.is_none()
    }
}

fn positive(field: &'static str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveLimit { field, value });
    }
    check_amount(field, value)
}

/// Spend figures computed for the current window.
///
/// `budget_remaining` goes negative when seeded or legacy history already
/// exceeds the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpend {
    pub monthly_spend: Decimal,
    pub budget_remaining: Decimal,
}

impl AgentSpend {
    pub fn compute(agent: &Agent, monthly_spend: Decimal) -> Self {
        Self {
            monthly_spend,
            budget_remaining: agent.monthly_budget - monthly_spend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_agent() -> NewAgent {
        NewAgent {
            name: "Code Generator".to_string(),
            role: "Automated code review".to_string(),
            owner_id: "user_001".to_string(),
            monthly_budget: dec!(25.00),
            per_action_limit: dec!(5.00),
            status: None,
        }
    }

    #[test]
    fn test_status_defaults_to_active() {
        let agent = new_agent().into_agent(Utc::now());
        assert_eq!(agent.status, AgentStatus::Active);
        assert!(!agent.is_paused());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!("paused".parse::<AgentStatus>().unwrap(), AgentStatus::Paused);
        assert_eq!(AgentStatus::Active.to_string(), "active");
        assert!("stopped".parse::<AgentStatus>().is_err());
        assert_eq!(serde_json::to_string(&AgentStatus::Paused).unwrap(), "\"paused\"");
    }

    #[test]
    fn test_limits_must_be_positive() {
        let mut input = new_agent();
        input.monthly_budget = Decimal::ZERO;
        assert_eq!(
            input.validate(),
            Err(LedgerError::NonPositiveLimit { field: "monthlyBudget", value: Decimal::ZERO })
        );

        let mut input = new_agent();
        input.per_action_limit = dec!(-1);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_limit_above_budget_is_allowed() {
        let mut input = new_agent();
        input.per_action_limit = dec!(100);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_partial_update() {
        let mut agent = new_agent().into_agent(Utc::now());
        let update = AgentUpdate {
            monthly_budget: Some(dec!(40)),
            status: Some(AgentStatus::Paused),
            ..Default::default()
        };
        agent.apply(&update, Utc::now());
        assert_eq!(agent.monthly_budget, dec!(40));
        assert_eq!(agent.per_action_limit, dec!(5.00));
        assert_eq!(agent.name, "Code Generator");
        assert!(agent.is_paused());
    }

    #[test]
    fn test_empty_role_is_ignored_on_update() {
        let mut agent = new_agent().into_agent(Utc::now());
        let update = AgentUpdate {
            role: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert_eq!(update.role(), None);

        agent.apply(&update, Utc::now());
        assert_eq!(agent.role, "Automated code review");
    }

    #[test]
    fn test_limits_must_fit_storage() {
        let mut input = new_agent();
        input.monthly_budget = Decimal::MAX;
        assert!(matches!(
            input.validate(),
            Err(LedgerError::AmountOutOfRange { field: "monthlyBudget", .. })
        ));

        let mut input = new_agent();
        input.per_action_limit = dec!(0.0000001);
        assert!(matches!(
            input.validate(),
            Err(LedgerError::TooPrecise { field: "perActionLimit", .. })
        ));

        let update = AgentUpdate {
            monthly_budget: Some(dec!(10000000000000)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_budget_remaining_may_go_negative() {
        let agent = new_agent().into_agent(Utc::now());
        let spend = AgentSpend::compute(&agent, dec!(25.50));
        assert_eq!(spend.budget_remaining, dec!(-0.50));
    }
}
