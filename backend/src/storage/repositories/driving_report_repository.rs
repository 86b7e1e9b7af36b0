use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::DrivingReport;
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::time::{from_millis, from_millis_opt, to_millis};

const REPORT_COLUMNS: &str = "id, child_id, trip_start, trip_end, start_location, end_location, \
     score, distance_miles, max_speed_mph, hard_braking";

#[derive(Clone)]
pub struct DrivingReportRepository {
    db: DbConnection,
}

impl DrivingReportRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_report(&self, report: &DrivingReport) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO driving_reports (id, child_id, trip_start, trip_end, start_location, end_location,
                                         score, distance_miles, max_speed_mph, hard_braking)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.id)
        .bind(&report.child_id)
        .bind(to_millis(&report.trip_start))
        .bind(report.trip_end.as_ref().map(to_millis))
        .bind(&report.start_location)
        .bind(&report.end_location)
        .bind(i64::from(report.score))
        .bind(report.distance_miles)
        .bind(report.max_speed_mph)
        .bind(i64::from(report.hard_braking))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// A child's trips, most recent start first
    pub async fn list_for_child(&self, child_id: &str) -> Result<Vec<DrivingReport>> {
        let sql = format!(
            "SELECT {} FROM driving_reports WHERE child_id = ? ORDER BY trip_start DESC, id DESC",
            REPORT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(child_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(row_to_report).collect()
    }

    /// Trips that started with `after < trip_start <= until`
    pub async fn list_in_window(
        &self,
        child_id: &str,
        after: &DateTime<Utc>,
        until: &DateTime<Utc>,
    ) -> Result<Vec<DrivingReport>> {
        let sql = format!(
            "SELECT {} FROM driving_reports \
             WHERE child_id = ? AND trip_start > ? AND trip_start <= ? \
             ORDER BY trip_start DESC, id DESC",
            REPORT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(child_id)
            .bind(to_millis(after))
            .bind(to_millis(until))
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(row_to_report).collect()
    }
}

fn row_to_report(row: &SqliteRow) -> Result<DrivingReport> {
    let score: i64 = row.try_get("score")?;
    let hard_braking: i64 = row.try_get("hard_braking")?;
    Ok(DrivingReport {
        id: row.try_get("id")?,
        child_id: row.try_get("child_id")?,
        trip_start: from_millis(row.try_get("trip_start")?)?,
        trip_end: from_millis_opt(row.try_get("trip_end")?)?,
        start_location: row.try_get("start_location")?,
        end_location: row.try_get("end_location")?,
        score: u32::try_from(score)?,
        distance_miles: row.try_get("distance_miles")?,
        max_speed_mph: row.try_get("max_speed_mph")?,
        hard_braking: u32::try_from(hard_braking)?,
    })
}
