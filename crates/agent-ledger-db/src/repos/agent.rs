//! Agent repository
//!
//! Besides CRUD this owns the two multi-table operations, spend submission
//! and reset. Both lock the agent row first so that concurrent calls for the
//! same agent run one after another.

use agent_ledger_guard::evaluate;
use agent_ledger_types::{
    Agent, AgentId, AgentStatus, AgentUpdate, Alert, AlertKind, NewAction, SpendWindow,
};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use super::{action, alert};
use crate::models::{convert_all, DbAgent};
use crate::store::Submission;
use crate::{DbError, DbResult};

const AGENT_COLUMNS: &str =
    "id, name, role, owner_id, status, monthly_budget, per_action_limit, created_at, updated_at";

/// Agent repository
pub struct AgentRepo {
    pool: PgPool,
}

impl AgentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new agent
    pub async fn create(&self, agent: &Agent) -> DbResult<Agent> {
        let row = sqlx::query_as::<_, DbAgent>(
            r#"
            INSERT INTO agents
                (id, name, role, owner_id, status, monthly_budget, per_action_limit, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, role, owner_id, status, monthly_budget, per_action_limit, created_at, updated_at
            "#
        )
        .bind(agent.id.0)
        .bind(&agent.name)
        .bind(&agent.role)
        .bind(&agent.owner_id)
        .bind(agent.status.as_str())
        .bind(agent.monthly_budget)
        .bind(agent.per_action_limit)
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Find agent by ID
    pub async fn find_by_id(&self, id: AgentId) -> DbResult<Option<Agent>> {
        let row = sqlx::query_as::<_, DbAgent>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Agent::try_from).transpose()
    }

    /// All agents, newest first
    pub async fn list(&self) -> DbResult<Vec<Agent>> {
        let rows = sqlx::query_as::<_, DbAgent>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    /// Partial update; absent fields keep their stored value
    pub async fn update(
        &self,
        id: AgentId,
        update: &AgentUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<Agent> {
        let row = sqlx::query_as::<_, DbAgent>(
            r#"
            UPDATE agents SET
                name = COALESCE($2, name),
                role = COALESCE($3, role),
                monthly_budget = COALESCE($4, monthly_budget),
                per_action_limit = COALESCE($5, per_action_limit),
                status = COALESCE($6, status),
                updated_at = $7
            WHERE id = $1
            RETURNING id, name, role, owner_id, status, monthly_budget, per_action_limit, created_at, updated_at
            "#
        )
        .bind(id.0)
        .bind(update.name.as_deref())
        .bind(update.role())
        .bind(update.monthly_budget)
        .bind(update.per_action_limit)
        .bind(update.status.map(|s| s.as_str()))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| not_found(id))?.try_into()
    }

    /// Check a proposed action against the agent's limits and apply the outcome.
    ///
    /// The agent row stays locked from the read until commit, so the spend
    /// sum cannot go stale underneath the rule. Returning early drops the
    /// transaction, which rolls it back.
    pub async fn submit_action(
        &self,
        input: NewAction,
        window: SpendWindow,
        now: DateTime<Utc>,
    ) -> DbResult<Submission> {
        let mut tx = self.pool.begin().await?;

        let agent = lock_agent(&mut tx, input.agent_id).await?;
        let spent = action::month_spend(&mut tx, agent.id, window).await?;

        let submission = match evaluate(&agent.limits(), input.cost, spent) {
            Ok(_) => {
                let log = input.into_log(now);
                action::insert_action(&mut tx, &log).await?;
                Submission::Logged(log)
            }
            Err(reason) if reason.pauses_agent() => {
                let message = reason.alert_message().unwrap_or_else(|| reason.to_string());
                let alert = Alert::new(agent.id, AlertKind::BudgetExceeded, message, now);
                set_status(&mut tx, agent.id, AgentStatus::Paused, now).await?;
                alert::insert_alert(&mut tx, &alert).await?;
                info!(agent_id = %agent.id, spent = %spent, "Agent auto-paused");
                Submission::Paused { reason, alert }
            }
            Err(reason) => return Ok(Submission::Rejected(reason)),
        };

        tx.commit().await?;
        Ok(submission)
    }

    /// Reactivate the agent and delete its actions and alerts
    pub async fn reset(&self, id: AgentId, now: DateTime<Utc>) -> DbResult<Agent> {
        let mut tx = self.pool.begin().await?;

        lock_agent(&mut tx, id).await?;
        let actions = action::delete_for_agent(&mut tx, id).await?;
        let alerts = alert::delete_for_agent(&mut tx, id).await?;
        let agent = set_status(&mut tx, id, AgentStatus::Active, now).await?;

        tx.commit().await?;

        info!(agent_id = %id, actions, alerts, "Agent reset");
        Ok(agent)
    }

    /// Delete every agent; actions and alerts go with them
    pub async fn purge_all(&self) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM alerts").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM action_logs").execute(&mut *tx).await?;
        let removed = sqlx::query("DELETE FROM agents").execute(&mut *tx).await?;
        tx.commit().await?;

        warn!(agents = removed.rows_affected(), "Ledger purged");
        Ok(())
    }
}

fn not_found(id: AgentId) -> DbError {
    DbError::NotFound(format!("agent {}", id))
}

async fn lock_agent(conn: &mut PgConnection, id: AgentId) -> DbResult<Agent> {
    let row = sqlx::query_as::<_, DbAgent>(&format!(
        "SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1 FOR UPDATE"
    ))
    .bind(id.0)
    .fetch_optional(&mut *conn)
    .await?;

    row.ok_or_else(|| not_found(id))?.try_into()
}

async fn set_status(
    conn: &mut PgConnection,
    id: AgentId,
    status: AgentStatus,
    now: DateTime<Utc>,
) -> DbResult<Agent> {
    let row = sqlx::query_as::<_, DbAgent>(
        r#"
        UPDATE agents SET status = $2, updated_at = $3
        WHERE id = $1
        RETURNING id, name, role, owner_id, status, monthly_budget, per_action_limit, created_at, updated_at
        "#
    )
    .bind(id.0)
    .bind(status.as_str())
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    row.try_into()
}
