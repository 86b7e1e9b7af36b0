//! Persistence for geofence evaluations: location samples, the per-(child,
//! location) containment state and the alerts derived from it.

use anyhow::Result;
use shared::{GeofenceAlert, LocationSample};
use sqlx::Row;
use std::collections::HashMap;

use crate::storage::connection::DbConnection;
use crate::storage::time::{from_millis, to_millis};

/// Stored containment of a child within one geofence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainmentRecord {
    pub is_inside: bool,
    pub version: i64,
}

/// A containment row to write as part of an evaluation.
///
/// `expected_version` is the version that was read; `None` means no row
/// existed and one must be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub location_id: String,
    pub is_inside: bool,
    pub expected_version: Option<i64>,
}

/// Everything one evaluation writes, committed atomically
#[derive(Debug)]
pub struct EvaluationCommit<'a> {
    pub sample: &'a LocationSample,
    pub state_changes: &'a [StateChange],
    pub alerts: &'a [GeofenceAlert],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Another writer changed the state row first; nothing was written
    Conflict { location_id: String },
}

#[derive(Clone)]
pub struct GeofenceRepository {
    db: DbConnection,
}

impl GeofenceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Load every stored containment row for a child, keyed by location ID
    pub async fn load_containment(&self, child_id: &str) -> Result<HashMap<String, ContainmentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT location_id, is_inside, version
            FROM containment_states
            WHERE child_id = ?
            "#,
        )
        .bind(child_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get("location_id")?,
                    ContainmentRecord {
                        is_inside: row.try_get("is_inside")?,
                        version: row.try_get("version")?,
                    },
                ))
            })
            .collect()
    }

    /// Write the sample, the containment changes and the alerts in one transaction.
    ///
    /// Each state row is written with a compare-and-set on its version. If any
    /// row was changed by someone else since it was read, the transaction is
    /// rolled back and `CommitOutcome::Conflict` is returned.
    pub async fn commit_evaluation(&self, commit: &EvaluationCommit<'_>) -> Result<CommitOutcome> {
        let mut tx = self.db.pool().begin().await?;
        let updated_at = to_millis(&commit.sample.timestamp);

        sqlx::query(
            r#"
            INSERT INTO location_samples (id, child_id, timestamp, latitude, longitude, accuracy_m)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&commit.sample.id)
        .bind(&commit.sample.child_id)
        .bind(to_millis(&commit.sample.timestamp))
        .bind(commit.sample.latitude)
        .bind(commit.sample.longitude)
        .bind(commit.sample.accuracy_m)
        .execute(&mut *tx)
        .await?;

        for change in commit.state_changes {
            let affected = match change.expected_version {
                Some(version) => sqlx::query(
                    r#"
                    UPDATE containment_states
                    SET is_inside = ?, version = version + 1, updated_at = ?
                    WHERE child_id = ? AND location_id = ? AND version = ?
                    "#,
                )
                .bind(change.is_inside)
                .bind(updated_at)
                .bind(&commit.sample.child_id)
                .bind(&change.location_id)
                .bind(version)
                .execute(&mut *tx)
                .await?
                .rows_affected(),
                None => sqlx::query(
                    r#"
                    INSERT INTO containment_states (child_id, location_id, is_inside, version, updated_at)
                    VALUES (?, ?, ?, 1, ?)
                    ON CONFLICT (child_id, location_id) DO NOTHING
                    "#,
                )
                .bind(&commit.sample.child_id)
                .bind(&change.location_id)
                .bind(change.is_inside)
                .bind(updated_at)
                .execute(&mut *tx)
                .await?
                .rows_affected(),
            };

            if affected == 0 {
                tx.rollback().await?;
                return Ok(CommitOutcome::Conflict {
                    location_id: change.location_id.clone(),
                });
            }
        }

        for alert in commit.alerts {
            sqlx::query(
                r#"
                INSERT INTO geofence_alerts (id, family_id, child_id, location_id, alert_type, timestamp, is_read)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&alert.id)
            .bind(&alert.family_id)
            .bind(&alert.child_id)
            .bind(&alert.location_id)
            .bind(alert.alert_type.to_string())
            .bind(to_millis(&alert.timestamp))
            .bind(alert.is_read)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(CommitOutcome::Committed)
    }

    /// A child's location history, newest first
    pub async fn list_samples(&self, child_id: &str, limit: u32) -> Result<Vec<LocationSample>> {
        let rows = sqlx::query(
            r#"
            SELECT id, child_id, timestamp, latitude, longitude, accuracy_m
            FROM location_samples
            WHERE child_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(child_id)
        .bind(i64::from(limit))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(LocationSample {
                    id: row.try_get("id")?,
                    child_id: row.try_get("child_id")?,
                    timestamp: from_millis(row.try_get("timestamp")?)?,
                    latitude: row.try_get("latitude")?,
                    longitude: row.try_get("longitude")?,
                    accuracy_m: row.try_get("accuracy_m")?,
                })
            })
            .collect()
    }
}
