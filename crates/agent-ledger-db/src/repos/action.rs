//! Action log repository

use agent_ledger_types::{ActionEntry, ActionLog, AgentId, SpendWindow};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::models::{convert_all, DbActionEntry};
use crate::DbResult;

/// Action log repository
pub struct ActionRepo {
    pool: PgPool,
}

impl ActionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an action as-is, no spend checks
    pub async fn insert(&self, log: &ActionLog) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_action(&mut conn, log).await
    }

    /// Sum of the agent's costs inside the window
    pub async fn month_spend(&self, agent_id: AgentId, window: SpendWindow) -> DbResult<Decimal> {
        let mut conn = self.pool.acquire().await?;
        month_spend(&mut conn, agent_id, window).await
    }

    /// Latest actions with agent names, optionally for one agent
    pub async fn list(&self, agent_id: Option<AgentId>, limit: i64) -> DbResult<Vec<ActionEntry>> {
        let rows = sqlx::query_as::<_, DbActionEntry>(
            r#"
            SELECT l.id, l.agent_id, l.action_type, l.target, l.cost, l.outcome, l.metadata,
                   l.created_at, a.name AS agent_name
            FROM action_logs l
            JOIN agents a ON a.id = l.agent_id
            WHERE $1::uuid IS NULL OR l.agent_id = $1
            ORDER BY l.created_at DESC
            LIMIT $2
            "#
        )
        .bind(agent_id.map(|id| id.0))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }
}

pub(crate) async fn insert_action(conn: &mut PgConnection, log: &ActionLog) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO action_logs (id, agent_id, action_type, target, cost, outcome, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#
    )
    .bind(log.id.0)
    .bind(log.agent_id.0)
    .bind(&log.action_type)
    .bind(&log.target)
    .bind(log.cost)
    .bind(log.outcome.as_str())
    .bind(log.metadata.as_ref().map(|m| m.as_str()))
    .bind(log.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn month_spend(
    conn: &mut PgConnection,
    agent_id: AgentId,
    window: SpendWindow,
) -> DbResult<Decimal> {
    let (total,): (Decimal,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(cost), 0)
        FROM action_logs
        WHERE agent_id = $1 AND created_at >= $2
        "#
    )
    .bind(agent_id.0)
    .bind(window.start)
    .fetch_one(&mut *conn)
    .await?;

    Ok(total)
}

pub(crate) async fn delete_for_agent(conn: &mut PgConnection, agent_id: AgentId) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM action_logs WHERE agent_id = $1")
        .bind(agent_id.0)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
