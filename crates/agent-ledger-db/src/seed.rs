//! Demo dataset
//!
//! Wipes the store and recreates two agents: one active with light usage,
//! one already paused after running past its budget.

use agent_ledger_guard::budget_exceeded_message;
use agent_ledger_types::{
    ActionMetadata, ActionOutcome, Agent, AgentStatus, AlertKind, NewAction, NewAgent,
    SpendWindow,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::store::LedgerStore;
use crate::DbResult;

/// Agents created by [`seed_demo`]
#[derive(Debug, Clone)]
pub struct SeededAgents {
    pub research_assistant: Agent,
    pub code_generator: Agent,
}

struct SampleAction {
    action_type: &'static str,
    target: &'static str,
    cost: Decimal,
    outcome: ActionOutcome,
    metadata: Option<&'static str>,
}

const fn sample(
    action_type: &'static str,
    target: &'static str,
    cents: i64,
    outcome: ActionOutcome,
    metadata: Option<&'static str>,
) -> SampleAction {
    SampleAction {
        action_type,
        target,
        cost: Decimal::from_parts(cents as u32, 0, 0, false, 2),
        outcome,
        metadata,
    }
}

const RESEARCH_ACTIONS: [SampleAction; 7] = [
    sample("api_call", "openai:gpt-4", 15, ActionOutcome::Success, Some(r#"{"tokens": 2500}"#)),
    sample("api_call", "openai:gpt-4", 8, ActionOutcome::Success, Some(r#"{"tokens": 1200}"#)),
    sample("web_search", "tavily:search", 1, ActionOutcome::Success, Some(r#"{"queries": 3}"#)),
    sample("api_call", "openai:gpt-4-turbo", 25, ActionOutcome::Success, Some(r#"{"tokens": 4000}"#)),
    sample("file_write", "reports/analysis.md", 0, ActionOutcome::Success, None),
    sample("api_call", "anthropic:claude-3", 18, ActionOutcome::Failure, Some(r#"{"error": "rate_limit"}"#)),
    sample("api_call", "anthropic:claude-3", 12, ActionOutcome::Success, Some(r#"{"tokens": 1800}"#)),
];

const CODEGEN_ACTIONS: [SampleAction; 6] = [
    sample("api_call", "openai:gpt-4", 450, ActionOutcome::Success, Some(r#"{"tokens": 75000}"#)),
    sample("code_review", "github:pr-123", 320, ActionOutcome::Success, Some(r#"{"files": 45}"#)),
    sample("api_call", "openai:gpt-4", 480, ActionOutcome::Success, Some(r#"{"tokens": 80000}"#)),
    sample("code_gen", "project:backend", 490, ActionOutcome::Success, Some(r#"{"lines": 2500}"#)),
    sample("api_call", "openai:gpt-4", 460, ActionOutcome::Success, Some(r#"{"tokens": 77000}"#)),
    sample("api_call", "openai:gpt-4", 350, ActionOutcome::Success, Some(r#"{"tokens": 58000}"#)),
];

/// Replace everything in `store` with the demo dataset.
///
/// Action timestamps are spread six hours apart going back from `now`, but
/// never before `window.start`, so the seeded spend always lands in the
/// current month.
pub async fn seed_demo(
    store: &dyn LedgerStore,
    window: SpendWindow,
    now: DateTime<Utc>,
) -> DbResult<SeededAgents> {
    store.purge_all().await?;

    let research_assistant = store
        .create_agent(
            NewAgent {
                name: "Research Assistant".to_string(),
                role: "Data analysis and report generation".to_string(),
                owner_id: "user_001".to_string(),
                monthly_budget: Decimal::new(5000, 2),
                per_action_limit: Decimal::new(200, 2),
                status: Some(AgentStatus::Active),
            },
            now - Duration::minutes(1),
        )
        .await?;

    let code_generator = store
        .create_agent(
            NewAgent {
                name: "Code Generator".to_string(),
                role: "Automated code review and generation".to_string(),
                owner_id: "user_001".to_string(),
                monthly_budget: Decimal::new(2500, 2),
                per_action_limit: Decimal::new(500, 2),
                status: Some(AgentStatus::Paused),
            },
            now,
        )
        .await?;

    record_samples(store, &research_assistant, &RESEARCH_ACTIONS, window, now).await?;
    let total = record_samples(store, &code_generator, &CODEGEN_ACTIONS, window, now).await?;

    store
        .record_alert(
            code_generator.id,
            AlertKind::BudgetExceeded,
            budget_exceeded_message(code_generator.monthly_budget, total),
            now,
        )
        .await?;

    info!(
        research_assistant = %research_assistant.id,
        code_generator = %code_generator.id,
        "Demo data seeded"
    );

    Ok(SeededAgents {
        research_assistant,
        code_generator,
    })
}

async fn record_samples(
    store: &dyn LedgerStore,
    agent: &Agent,
    samples: &[SampleAction],
    window: SpendWindow,
    now: DateTime<Utc>,
) -> DbResult<Decimal> {
    let mut total = Decimal::ZERO;
    for (i, sample) in samples.iter().enumerate() {
        let input = NewAction {
            agent_id: agent.id,
            action_type: sample.action_type.to_string(),
            target: sample.target.to_string(),
            cost: sample.cost,
            outcome: sample.outcome,
            metadata: sample.metadata.map(ActionMetadata::new),
        };
        let at = (now - Duration::hours(6 * (i as i64 + 1))).max(window.start);
        store.record_history(input, at).await?;
        total += sample.cost;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLedgerStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_seed_creates_demo_agents() {
        let store = MemoryLedgerStore::new();
        let window = SpendWindow::calendar_month(&now());
        let seeded = seed_demo(&store, window, now()).await.unwrap();

        let agents = store.list_agents().await.unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "Code Generator");

        assert_eq!(
            store.month_spend(seeded.research_assistant.id, window).await.unwrap(),
            dec!(0.79)
        );
        assert_eq!(
            store.month_spend(seeded.code_generator.id, window).await.unwrap(),
            dec!(25.50)
        );
        assert!(seeded.code_generator.is_paused());

        let alerts = store.list_alerts(Some(seeded.code_generator.id), 10).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].alert.message,
            "Agent auto-paused: monthly budget of $25 exceeded (attempted spend: $25.50)"
        );
    }

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let store = MemoryLedgerStore::new();
        let window = SpendWindow::calendar_month(&now());
        seed_demo(&store, window, now()).await.unwrap();
        seed_demo(&store, window, now()).await.unwrap();

        assert_eq!(store.list_agents().await.unwrap().len(), 2);
        assert_eq!(store.list_actions(None, 100).await.unwrap().len(), 13);
        assert_eq!(store.list_alerts(None, 100).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_near_month_start_stays_in_window() {
        let store = MemoryLedgerStore::new();
        let early = Utc.with_ymd_and_hms(2026, 11, 1, 3, 0, 0).unwrap();
        let window = SpendWindow::calendar_month(&early);
        let seeded = seed_demo(&store, window, early).await.unwrap();

        assert_eq!(
            store.month_spend(seeded.code_generator.id, window).await.unwrap(),
            dec!(25.50)
        );
        assert_eq!(
            store.month_spend(seeded.research_assistant.id, window).await.unwrap(),
            dec!(0.79)
        );
        let actions = store.list_actions(None, 100).await.unwrap();
        assert!(actions.iter().all(|entry| entry.action.created_at >= window.start));
    }

    #[test]
    fn test_sample_costs() {
        assert_eq!(RESEARCH_ACTIONS[0].cost, dec!(0.15));
        assert_eq!(CODEGEN_ACTIONS[0].cost, dec!(4.50));
    }
}
