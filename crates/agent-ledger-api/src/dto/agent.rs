//! Agent DTOs

use agent_ledger_types::{Agent, AgentSpend, AgentStatus, AgentUpdate, NewAgent};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{ActionResponse, AlertResponse};

/// Create agent request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    /// Free-form description of what the agent does
    #[serde(default)]
    pub role: String,
    #[validate(length(min = 1, message = "ownerId is required"))]
    pub owner_id: String,
    #[schema(value_type = String, example = "50.00")]
    pub monthly_budget: Decimal,
    #[schema(value_type = String, example = "2.00")]
    pub per_action_limit: Decimal,
    /// Defaults to `active`
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "active")]
    pub status: Option<AgentStatus>,
}

impl From<CreateAgentRequest> for NewAgent {
    fn from(req: CreateAgentRequest) -> Self {
        NewAgent {
            name: req.name,
            role: req.role,
            owner_id: req.owner_id,
            monthly_budget: req.monthly_budget,
            per_action_limit: req.per_action_limit,
            status: req.status,
        }
    }
}

/// Partial agent update; omitted fields are unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: Option<String>,
    pub role: Option<String>,
    #[schema(value_type = Option<String>, example = "100.00")]
    pub monthly_budget: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "5.00")]
    pub per_action_limit: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "paused")]
    pub status: Option<AgentStatus>,
}

impl From<UpdateAgentRequest> for AgentUpdate {
    fn from(req: UpdateAgentRequest) -> Self {
        AgentUpdate {
            name: req.name,
            role: req.role,
            monthly_budget: req.monthly_budget,
            per_action_limit: req.per_action_limit,
            status: req.status,
        }
    }
}

/// An agent record
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub owner_id: String,
    #[schema(value_type = String, example = "active")]
    pub status: AgentStatus,
    #[schema(value_type = String, example = "50.00")]
    pub monthly_budget: Decimal,
    #[schema(value_type = String, example = "2.00")]
    pub per_action_limit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Agent> for AgentResponse {
    fn from(agent: Agent) -> Self {
        Self {
            id: agent.id.0,
            name: agent.name,
            role: agent.role,
            owner_id: agent.owner_id,
            status: agent.status,
            monthly_budget: agent.monthly_budget,
            per_action_limit: agent.per_action_limit,
            created_at: agent.created_at,
            updated_at: agent.updated_at,
        }
    }
}

/// Agent listing entry with current-month spend and recent alerts
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    #[serde(flatten)]
    pub agent: AgentResponse,
    #[schema(value_type = String, example = "0.79")]
    pub monthly_spend: Decimal,
    /// Negative when spend already exceeds the budget
    #[schema(value_type = String, example = "49.21")]
    pub budget_remaining: Decimal,
    pub alerts: Vec<AlertResponse>,
}

impl AgentSummary {
    pub fn new(agent: Agent, spend: AgentSpend, alerts: Vec<AlertResponse>) -> Self {
        Self {
            agent: agent.into(),
            monthly_spend: spend.monthly_spend,
            budget_remaining: spend.budget_remaining,
            alerts,
        }
    }
}

/// Single agent with spend, recent actions and recent alerts
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    #[serde(flatten)]
    pub agent: AgentResponse,
    #[schema(value_type = String, example = "25.50")]
    pub monthly_spend: Decimal,
    #[schema(value_type = String, example = "-0.50")]
    pub budget_remaining: Decimal,
    pub actions: Vec<ActionResponse>,
    pub alerts: Vec<AlertResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateAgentRequest = serde_json::from_str(
            r#"{"name":"Research Assistant","ownerId":"user_001","monthlyBudget":"50.00","perActionLimit":2}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.role, "");
        assert!(req.status.is_none());

        let new_agent = NewAgent::from(req);
        assert_eq!(new_agent.per_action_limit, dec!(2));
    }

    #[test]
    fn test_blank_owner_rejected() {
        let req: CreateAgentRequest = serde_json::from_str(
            r#"{"name":"a","ownerId":"","monthlyBudget":"1","perActionLimit":"1"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_summary_serializes_flat_camel_case() {
        let agent = NewAgent {
            name: "Code Generator".to_string(),
            role: String::new(),
            owner_id: "user_001".to_string(),
            monthly_budget: dec!(25.00),
            per_action_limit: dec!(5.00),
            status: Some(AgentStatus::Paused),
        }
        .into_agent(Utc::now());
        let spend = AgentSpend::compute(&agent, dec!(25.50));
        let json = serde_json::to_value(AgentSummary::new(agent, spend, Vec::new())).unwrap();

        assert_eq!(json["status"], "paused");
        assert_eq!(json["monthlySpend"], "25.50");
        assert_eq!(json["budgetRemaining"], "-0.50");
        assert!(json["alerts"].as_array().unwrap().is_empty());
    }
}
