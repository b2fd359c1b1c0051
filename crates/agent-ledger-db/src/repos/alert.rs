//! Alert repository

use agent_ledger_types::{AgentId, Alert, AlertEntry};
use sqlx::{PgConnection, PgPool};

use crate::models::{convert_all, DbAlertEntry};
use crate::DbResult;

/// Alert repository
pub struct AlertRepo {
    pool: PgPool,
}

impl AlertRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, alert: &Alert) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_alert(&mut conn, alert).await
    }

    /// Latest alerts with agent names, optionally for one agent
    pub async fn list(&self, agent_id: Option<AgentId>, limit: i64) -> DbResult<Vec<AlertEntry>> {
        let rows = sqlx::query_as::<_, DbAlertEntry>(
            r#"
            SELECT al.id, al.agent_id, al.alert_type, al.message, al.created_at,
                   a.name AS agent_name
            FROM alerts al
            JOIN agents a ON a.id = al.agent_id
            WHERE $1::uuid IS NULL OR al.agent_id = $1
            ORDER BY al.created_at DESC
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

pub(crate) async fn insert_alert(conn: &mut PgConnection, alert: &Alert) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO alerts (id, agent_id, alert_type, message, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#
    )
    .bind(alert.id.0)
    .bind(alert.agent_id.0)
    .bind(alert.kind.as_str())
    .bind(&alert.message)
    .bind(alert.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn delete_for_agent(conn: &mut PgConnection, agent_id: AgentId) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM alerts WHERE agent_id = $1")
        .bind(agent_id.0)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
