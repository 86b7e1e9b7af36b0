use anyhow::Result;
use shared::{GeofenceAlert, GeofenceAlertView};
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::time::from_millis;

/// Repository for the geofence alert inbox. Alerts are only ever inserted by
/// `GeofenceRepository::commit_evaluation`; this side reads and marks them.
#[derive(Clone)]
pub struct AlertRepository {
    db: DbConnection,
}

impl AlertRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List a family's alerts newest first, with child and location names
    pub async fn list_for_family(
        &self,
        family_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<GeofenceAlertView>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.family_id, a.child_id, a.location_id, a.alert_type, a.timestamp, a.is_read,
                   c.name AS child_name, l.name AS location_name
            FROM geofence_alerts a
            JOIN children c ON c.id = a.child_id
            JOIN locations l ON l.id = a.location_id
            WHERE a.family_id = ?
            ORDER BY a.timestamp DESC, a.id DESC
            LIMIT ?
            "#,
        )
        .bind(family_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(GeofenceAlertView {
                    alert: row_to_alert(row)?,
                    child_name: row.try_get("child_name")?,
                    location_name: row.try_get("location_name")?,
                })
            })
            .collect()
    }

    pub async fn get_alert(&self, alert_id: &str) -> Result<Option<GeofenceAlert>> {
        let row = sqlx::query(
            r#"
            SELECT id, family_id, child_id, location_id, alert_type, timestamp, is_read
            FROM geofence_alerts
            WHERE id = ?
            "#,
        )
        .bind(alert_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(row_to_alert).transpose()
    }

    /// Mark one alert read. Returns true only if it was unread before.
    pub async fn mark_read(&self, alert_id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE geofence_alerts SET is_read = TRUE WHERE id = ? AND is_read = FALSE")
            .bind(alert_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_read(&self, family_id: &str) -> Result<u32> {
        let result = sqlx::query(
            "UPDATE geofence_alerts SET is_read = TRUE WHERE family_id = ? AND is_read = FALSE",
        )
        .bind(family_id)
        .execute(self.db.pool())
        .await?;
        Ok(u32::try_from(result.rows_affected())?)
    }

    pub async fn unread_count(&self, family_id: &str) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM geofence_alerts WHERE family_id = ? AND is_read = FALSE",
        )
        .bind(family_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(u32::try_from(count)?)
    }
}

fn row_to_alert(row: &SqliteRow) -> Result<GeofenceAlert> {
    let alert_type: String = row.try_get("alert_type")?;
    Ok(GeofenceAlert {
        id: row.try_get("id")?,
        family_id: row.try_get("family_id")?,
        child_id: row.try_get("child_id")?,
        location_id: row.try_get("location_id")?,
        alert_type: alert_type.parse()?,
        timestamp: from_millis(row.try_get("timestamp")?)?,
        is_read: row.try_get("is_read")?,
    })
}
