use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::HealthLog;
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::time::{from_millis, to_millis};

/// Repository for health log entries
#[derive(Clone)]
pub struct HealthLogRepository {
    db: DbConnection,
}

impl HealthLogRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_log(&self, log: &HealthLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO health_logs (id, child_id, log_type, value, notes, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.child_id)
        .bind(log.log_type.to_string())
        .bind(&log.value)
        .bind(&log.notes)
        .bind(to_millis(&log.timestamp))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// All of a child's logs, newest first
    pub async fn list_for_child(&self, child_id: &str) -> Result<Vec<HealthLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, child_id, log_type, value, notes, timestamp
            FROM health_logs
            WHERE child_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(child_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_log).collect()
    }

    /// Logs of every child in a family, newest first
    pub async fn list_for_family(&self, family_id: &str) -> Result<Vec<HealthLog>> {
        let rows = sqlx::query(
            r#"
            SELECT h.id, h.child_id, h.log_type, h.value, h.notes, h.timestamp
            FROM health_logs h
            JOIN children c ON c.id = h.child_id
            WHERE c.family_id = ?
            ORDER BY h.timestamp DESC, h.id DESC
            "#,
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_log).collect()
    }

    /// A child's logs with `after < timestamp <= until`, newest first
    pub async fn list_in_window(
        &self,
        child_id: &str,
        after: &DateTime<Utc>,
        until: &DateTime<Utc>,
    ) -> Result<Vec<HealthLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, child_id, log_type, value, notes, timestamp
            FROM health_logs
            WHERE child_id = ? AND timestamp > ? AND timestamp <= ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(child_id)
        .bind(to_millis(after))
        .bind(to_millis(until))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_log).collect()
    }

    pub async fn delete_log(&self, log_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM health_logs WHERE id = ?")
            .bind(log_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_log(row: &SqliteRow) -> Result<HealthLog> {
    let log_type: String = row.try_get("log_type")?;
    Ok(HealthLog {
        id: row.try_get("id")?,
        child_id: row.try_get("child_id")?,
        log_type: log_type.parse()?,
        value: row.try_get("value")?,
        notes: row.try_get("notes")?,
        timestamp: from_millis(row.try_get("timestamp")?)?,
    })
}
