//! In-memory ledger store
//!
//! Every operation takes the single table lock once, so `submit_action`
//! observes and mutates a consistent snapshot. Used for tests, demos and
//! `--in-memory` servers; nothing survives a restart.

use agent_ledger_guard::evaluate;
use agent_ledger_types::{
    ActionEntry, ActionLog, Agent, AgentId, AgentStatus, AgentUpdate, Alert, AlertEntry, AlertKind,
    NewAction, NewAgent, SpendWindow,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::store::{HealthStatus, LedgerStore, Submission};
use crate::{DbError, DbResult};

#[derive(Debug, Default)]
struct Tables {
    agents: Vec<Agent>,
    actions: Vec<ActionLog>,
    alerts: Vec<Alert>,
}

impl Tables {
    fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    fn agent_mut(&mut self, id: AgentId) -> DbResult<&mut Agent> {
        self.agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn agent_name(&self, id: AgentId) -> String {
        self.agent(id).map(|a| a.name.clone()).unwrap_or_default()
    }

    fn spend(&self, id: AgentId, window: SpendWindow) -> DbResult<Decimal> {
        self.actions
            .iter()
            .filter(|a| a.agent_id == id && window.contains(a.created_at))
            .try_fold(Decimal::ZERO, |total, a| total.checked_add(a.cost))
            .ok_or_else(|| DbError::Corrupt(format!("month spend of agent {} overflows", id)))
    }
}

fn not_found(id: AgentId) -> DbError {
    DbError::NotFound(format!("agent {}", id))
}

/// Newest first; among equal timestamps the later insert wins
fn newest_first<T: Clone>(
    rows: impl DoubleEndedIterator<Item = T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut rows: Vec<T> = rows.rev().collect();
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    rows
}

fn take(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

/// Ledger store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    tables: RwLock<Tables>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn create_agent(&self, input: NewAgent, now: DateTime<Utc>) -> DbResult<Agent> {
        input.validate()?;
        let agent = input.into_agent(now);
        self.tables.write().agents.push(agent.clone());
        debug!(agent_id = %agent.id, "Agent created");
        Ok(agent)
    }

    async fn find_agent(&self, id: AgentId) -> DbResult<Option<Agent>> {
        Ok(self.tables.read().agent(id).cloned())
    }

    async fn list_agents(&self) -> DbResult<Vec<Agent>> {
        let tables = self.tables.read();
        Ok(newest_first(tables.agents.iter().cloned(), |a| a.created_at))
    }

    async fn update_agent(
        &self,
        id: AgentId,
        update: AgentUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<Agent> {
        update.validate()?;
        let mut tables = self.tables.write();
        let agent = tables.agent_mut(id)?;
        agent.apply(&update, now);
        Ok(agent.clone())
    }

    async fn month_spend(&self, id: AgentId, window: SpendWindow) -> DbResult<Decimal> {
        self.tables.read().spend(id, window)
    }

    async fn submit_action(
        &self,
        input: NewAction,
        window: SpendWindow,
        now: DateTime<Utc>,
    ) -> DbResult<Submission> {
        input.validate()?;
        let mut tables = self.tables.write();
        let agent = tables.agent(input.agent_id).ok_or_else(|| not_found(input.agent_id))?;
        let limits = agent.limits();
        let spent = tables.spend(input.agent_id, window)?;

        match evaluate(&limits, input.cost, spent) {
            Ok(_) => {
                let log = input.into_log(now);
                tables.actions.push(log.clone());
                Ok(Submission::Logged(log))
            }
            Err(reason) if reason.pauses_agent() => {
                let message = reason.alert_message().unwrap_or_else(|| reason.to_string());
                let alert = Alert::new(input.agent_id, AlertKind::BudgetExceeded, message, now);
                let agent = tables.agent_mut(input.agent_id)?;
                agent.status = AgentStatus::Paused;
                agent.updated_at = now;
                tables.alerts.push(alert.clone());
                info!(agent_id = %input.agent_id, "Agent auto-paused");
                Ok(Submission::Paused { reason, alert })
            }
            Err(reason) => Ok(Submission::Rejected(reason)),
        }
    }

    async fn reset_agent(&self, id: AgentId, now: DateTime<Utc>) -> DbResult<Agent> {
        let mut tables = self.tables.write();
        let agent = tables.agent_mut(id)?;
        agent.status = AgentStatus::Active;
        agent.updated_at = now;
        let agent = agent.clone();
        tables.actions.retain(|a| a.agent_id != id);
        tables.alerts.retain(|a| a.agent_id != id);
        Ok(agent)
    }

    async fn list_actions(&self, agent: Option<AgentId>, limit: i64) -> DbResult<Vec<ActionEntry>> {
        let tables = self.tables.read();
        let rows = tables
            .actions
            .iter()
            .filter(|a| agent.map_or(true, |id| a.agent_id == id))
            .cloned();
        Ok(newest_first(rows, |a| a.created_at)
            .into_iter()
            .take(take(limit))
            .map(|action| ActionEntry {
                agent_name: tables.agent_name(action.agent_id),
                action,
            })
            .collect())
    }

    async fn list_alerts(&self, agent: Option<AgentId>, limit: i64) -> DbResult<Vec<AlertEntry>> {
        let tables = self.tables.read();
        let rows = tables
            .alerts
            .iter()
            .filter(|a| agent.map_or(true, |id| a.agent_id == id))
            .cloned();
        Ok(newest_first(rows, |a| a.created_at)
            .into_iter()
            .take(take(limit))
            .map(|alert| AlertEntry {
                agent_name: tables.agent_name(alert.agent_id),
                alert,
            })
            .collect())
    }

    async fn record_history(&self, input: NewAction, at: DateTime<Utc>) -> DbResult<ActionLog> {
        input.validate()?;
        let mut tables = self.tables.write();
        if tables.agent(input.agent_id).is_none() {
            return Err(not_found(input.agent_id));
        }
        let log = input.into_log(at);
        tables.actions.push(log.clone());
        Ok(log)
    }

    async fn record_alert(
        &self,
        agent: AgentId,
        kind: AlertKind,
        message: String,
        at: DateTime<Utc>,
    ) -> DbResult<Alert> {
        let mut tables = self.tables.write();
        if tables.agent(agent).is_none() {
            return Err(not_found(agent));
        }
        let alert = Alert::new(agent, kind, message, at);
        tables.alerts.push(alert.clone());
        Ok(alert)
    }

    async fn purge_all(&self) -> DbResult<()> {
        *self.tables.write() = Tables::default();
        Ok(())
    }

    async fn health_check(&self) -> DbResult<HealthStatus> {
        Ok(HealthStatus {
            backend: "memory",
            healthy: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_ledger_guard::GuardError;
    use agent_ledger_types::{ActionMetadata, ActionOutcome};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn window() -> SpendWindow {
        SpendWindow::calendar_month(&now())
    }

    fn new_agent(budget: Decimal, limit: Decimal) -> NewAgent {
        NewAgent {
            name: "Code Generator".to_string(),
            role: "Code generation".to_string(),
            owner_id: "user_001".to_string(),
            monthly_budget: budget,
            per_action_limit: limit,
            status: None,
        }
    }

    fn action(agent_id: AgentId, cost: Decimal) -> NewAction {
        NewAction {
            agent_id,
            action_type: "api_call".to_string(),
            target: "openai:gpt-4".to_string(),
            cost,
            outcome: ActionOutcome::Success,
            metadata: Some(ActionMetadata::new(r#"{"tokens": 1200}"#)),
        }
    }

    async fn agent_with_spend(store: &MemoryLedgerStore, spent: Decimal) -> Agent {
        let agent = store.create_agent(new_agent(dec!(25.00), dec!(5.00)), now()).await.unwrap();
        if spent > Decimal::ZERO {
            store
                .record_history(action(agent.id, spent), now() - Duration::hours(1))
                .await
                .unwrap();
        }
        agent
    }

    #[tokio::test]
    async fn test_scenario_accept_then_auto_pause() {
        let store = MemoryLedgerStore::new();
        let agent = agent_with_spend(&store, dec!(21.00)).await;

        let first = store.submit_action(action(agent.id, dec!(3.00)), window(), now()).await.unwrap();
        assert!(first.is_logged());
        assert_eq!(store.month_spend(agent.id, window()).await.unwrap(), dec!(24.00));

        let second = store.submit_action(action(agent.id, dec!(4.00)), window(), now()).await.unwrap();
        let Submission::Paused { reason, alert } = second else {
            panic!("expected auto-pause");
        };
        assert!(matches!(reason, GuardError::MonthlyBudgetExceeded { .. }));
        assert!(alert.message.contains("$25"));
        assert!(alert.message.contains("$28.00"));

        let stored = store.find_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AgentStatus::Paused);
        assert_eq!(store.list_alerts(Some(agent.id), 10).await.unwrap().len(), 1);
        // The rejected attempt is not logged
        assert_eq!(store.list_actions(Some(agent.id), 100).await.unwrap().len(), 2);
        assert_eq!(store.month_spend(agent.id, window()).await.unwrap(), dec!(24.00));
    }

    #[tokio::test]
    async fn test_paused_agent_writes_nothing() {
        let store = MemoryLedgerStore::new();
        let mut input = new_agent(dec!(25.00), dec!(5.00));
        input.status = Some(AgentStatus::Paused);
        let agent = store.create_agent(input, now()).await.unwrap();

        let result = store.submit_action(action(agent.id, dec!(0.01)), window(), now()).await.unwrap();
        assert_eq!(result, Submission::Rejected(GuardError::AgentPaused));
        assert!(store.list_actions(None, 100).await.unwrap().is_empty());
        assert!(store.list_alerts(None, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_per_action_limit_does_not_pause() {
        let store = MemoryLedgerStore::new();
        let agent = agent_with_spend(&store, Decimal::ZERO).await;

        let result = store.submit_action(action(agent.id, dec!(5.01)), window(), now()).await.unwrap();
        assert!(matches!(result, Submission::Rejected(GuardError::PerActionLimitExceeded { .. })));
        let stored = store.find_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AgentStatus::Active);
        assert!(store.list_alerts(None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_budget_equality_keeps_agent_active() {
        let store = MemoryLedgerStore::new();
        let agent = agent_with_spend(&store, dec!(20.00)).await;

        let result = store.submit_action(action(agent.id, dec!(5.00)), window(), now()).await.unwrap();
        assert!(result.is_logged());
        assert!(!store.find_agent(agent.id).await.unwrap().unwrap().is_paused());
    }

    #[tokio::test]
    async fn test_previous_month_does_not_count() {
        let store = MemoryLedgerStore::new();
        let agent = agent_with_spend(&store, Decimal::ZERO).await;
        let last_month = Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap();
        store.record_history(action(agent.id, dec!(24.00)), last_month).await.unwrap();

        assert_eq!(store.month_spend(agent.id, window()).await.unwrap(), Decimal::ZERO);
        let result = store.submit_action(action(agent.id, dec!(5.00)), window(), now()).await.unwrap();
        assert!(result.is_logged());
    }

    #[tokio::test]
    async fn test_reset_clears_history_and_reactivates() {
        let store = MemoryLedgerStore::new();
        let agent = agent_with_spend(&store, dec!(24.00)).await;
        let other = agent_with_spend(&store, dec!(1.00)).await;
        store.submit_action(action(agent.id, dec!(4.00)), window(), now()).await.unwrap();

        let reset = store.reset_agent(agent.id, now()).await.unwrap();
        assert_eq!(reset.status, AgentStatus::Active);
        assert_eq!(store.month_spend(agent.id, window()).await.unwrap(), Decimal::ZERO);
        assert!(store.list_actions(Some(agent.id), 100).await.unwrap().is_empty());
        assert!(store.list_alerts(Some(agent.id), 100).await.unwrap().is_empty());
        // Other agents are untouched
        assert_eq!(store.month_spend(other.id, window()).await.unwrap(), dec!(1.00));
    }

    #[tokio::test]
    async fn test_unknown_agent_is_not_found() {
        let store = MemoryLedgerStore::new();
        let missing = AgentId::new();
        assert!(matches!(
            store.submit_action(action(missing, dec!(1)), window(), now()).await,
            Err(DbError::NotFound(_))
        ));
        assert!(matches!(store.reset_agent(missing, now()).await, Err(DbError::NotFound(_))));
        assert!(matches!(
            store.update_agent(missing, AgentUpdate::default(), now()).await,
            Err(DbError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listings_are_newest_first_with_names() {
        let store = MemoryLedgerStore::new();
        let agent = agent_with_spend(&store, Decimal::ZERO).await;
        for hours in [3, 1, 2] {
            store
                .record_history(action(agent.id, dec!(0.10)), now() - Duration::hours(hours))
                .await
                .unwrap();
        }

        let entries = store.list_actions(None, 2).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action.created_at, now() - Duration::hours(1));
        assert_eq!(entries[1].action.created_at, now() - Duration::hours(2));
        assert_eq!(entries[0].agent_name, "Code Generator");
    }

    #[tokio::test]
    async fn test_update_validates_and_applies() {
        let store = MemoryLedgerStore::new();
        let agent = agent_with_spend(&store, Decimal::ZERO).await;
        let update = AgentUpdate {
            monthly_budget: Some(dec!(100)),
            status: Some(AgentStatus::Paused),
            ..Default::default()
        };
        let updated = store.update_agent(agent.id, update, now()).await.unwrap();
        assert_eq!(updated.monthly_budget, dec!(100));
        assert!(updated.is_paused());

        let bad = AgentUpdate {
            per_action_limit: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert!(matches!(
            store.update_agent(agent.id, bad, now()).await,
            Err(DbError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unstorable_amounts_are_rejected() {
        let store = MemoryLedgerStore::new();
        assert!(matches!(
            store.create_agent(new_agent(Decimal::MAX, Decimal::MAX), now()).await,
            Err(DbError::InvalidInput(_))
        ));

        let agent = agent_with_spend(&store, Decimal::ZERO).await;
        for cost in [Decimal::MAX, dec!(0.0000004)] {
            assert!(matches!(
                store.submit_action(action(agent.id, cost), window(), now()).await,
                Err(DbError::InvalidInput(_))
            ));
        }
        assert!(store.list_actions(None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_largest_amounts_pause_instead_of_overflowing() {
        let store = MemoryLedgerStore::new();
        let largest = dec!(999999999999.999999);
        let agent = store.create_agent(new_agent(largest, largest), now()).await.unwrap();

        let first = store.submit_action(action(agent.id, largest), window(), now()).await.unwrap();
        assert!(first.is_logged());

        let second = store.submit_action(action(agent.id, largest), window(), now()).await.unwrap();
        assert!(matches!(second, Submission::Paused { .. }));
        assert_eq!(store.month_spend(agent.id, window()).await.unwrap(), largest);
    }

    #[tokio::test]
    async fn test_empty_role_keeps_stored_role() {
        let store = MemoryLedgerStore::new();
        let agent = agent_with_spend(&store, Decimal::ZERO).await;
        let update = AgentUpdate {
            role: Some(String::new()),
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = store.update_agent(agent.id, update, now()).await.unwrap();
        assert_eq!(updated.role, "Code generation");
        assert_eq!(updated.name, "Renamed");
    }

    #[tokio::test]
    async fn test_concurrent_submissions_respect_budget() {
        let store = Arc::new(MemoryLedgerStore::new());
        let agent_id = agent_with_spend(&store, dec!(20.00)).await.id;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.submit_action(action(agent_id, dec!(4.00)), window(), now()).await.unwrap()
            }));
        }
        let mut logged = 0;
        for handle in handles {
            if handle.await.unwrap().is_logged() {
                logged += 1;
            }
        }

        assert_eq!(logged, 1);
        assert_eq!(store.month_spend(agent_id, window()).await.unwrap(), dec!(24.00));
        assert_eq!(store.list_alerts(Some(agent_id), 10).await.unwrap().len(), 1);
    }
}
