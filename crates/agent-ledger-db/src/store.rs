//! Storage abstraction
//!
//! Handlers and the seeder talk to a [`LedgerStore`]; the PostgreSQL
//! [`Database`](crate::Database) and the [`MemoryLedgerStore`](crate::MemoryLedgerStore)
//! both implement it.
//!
//! `submit_action` is the one operation with real consistency demands: the
//! agent read, the spend sum, the rule, and the resulting writes happen as
//! one unit, serialised per agent. Two concurrent submissions can therefore
//! never both pass a budget that only one of them fits in.

use agent_ledger_guard::GuardError;
use agent_ledger_types::{
    ActionEntry, ActionLog, Agent, AgentId, AgentUpdate, Alert, AlertEntry, AlertKind, NewAction,
    NewAgent, SpendWindow,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::DbResult;

/// Outcome of [`LedgerStore::submit_action`]
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The action passed every check and was written
    Logged(ActionLog),
    /// Refused without side effects
    Rejected(GuardError),
    /// Refused; the agent was paused and this alert written in the same unit
    Paused { reason: GuardError, alert: Alert },
}

impl Submission {
    pub fn is_logged(&self) -> bool {
        matches!(self, Self::Logged(_))
    }

    /// Metric label for this outcome
    pub fn label(&self) -> &'static str {
        match self {
            Self::Logged(_) => "logged",
            Self::Rejected(GuardError::AgentPaused) => "rejected_paused",
            Self::Rejected(GuardError::PerActionLimitExceeded { .. }) => "rejected_per_action",
            Self::Rejected(_) => "rejected_invalid",
            Self::Paused { .. } => "rejected_budget",
        }
    }
}

/// Backend health
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub backend: &'static str,
    pub healthy: bool,
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert a validated agent
    async fn create_agent(&self, input: NewAgent, now: DateTime<Utc>) -> DbResult<Agent>;

    async fn find_agent(&self, id: AgentId) -> DbResult<Option<Agent>>;

    /// All agents, newest first
    async fn list_agents(&self) -> DbResult<Vec<Agent>>;

    /// Apply a partial update. `NotFound` if the agent does not exist.
    async fn update_agent(
        &self,
        id: AgentId,
        update: AgentUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<Agent>;

    /// Sum of costs of the agent's actions inside `window`
    async fn month_spend(&self, id: AgentId, window: SpendWindow) -> DbResult<Decimal>;

    /// Run the spend rule against the agent and apply its outcome atomically.
    ///
    /// `NotFound` if the agent does not exist.
    async fn submit_action(
        &self,
        input: NewAction,
        window: SpendWindow,
        now: DateTime<Utc>,
    ) -> DbResult<Submission>;

    /// Set the agent back to `active` and delete its actions and alerts,
    /// in one unit. `NotFound` if the agent does not exist.
    async fn reset_agent(&self, id: AgentId, now: DateTime<Utc>) -> DbResult<Agent>;

    /// Actions joined with agent names, newest first, optionally for one agent
    async fn list_actions(&self, agent: Option<AgentId>, limit: i64) -> DbResult<Vec<ActionEntry>>;

    /// Alerts joined with agent names, newest first, optionally for one agent
    async fn list_alerts(&self, agent: Option<AgentId>, limit: i64) -> DbResult<Vec<AlertEntry>>;

    /// Write an action with an explicit timestamp, bypassing the spend rule.
    /// Used for seeding and imports.
    async fn record_history(&self, input: NewAction, at: DateTime<Utc>) -> DbResult<ActionLog>;

    /// Write an alert directly, bypassing the spend rule
    async fn record_alert(
        &self,
        agent: AgentId,
        kind: AlertKind,
        message: String,
        at: DateTime<Utc>,
    ) -> DbResult<Alert>;

    /// Delete every alert, action and agent
    async fn purge_all(&self) -> DbResult<()>;

    async fn health_check(&self) -> DbResult<HealthStatus>;
}
