use chrono::{DateTime, Utc};
use log::{info, warn};
use shared::{Child, DrivingWeeklySummary, HealthWeeklySummary, WeeklySummary};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::summary::{summarize_driving, summarize_health, SummaryWindow};
use crate::storage::time::{now, truncate_to_millis};
use crate::storage::{
    CheckInRepository, ChildRepository, DbConnection, DrivingReportRepository, HealthLogRepository,
};

/// Builds weekly summaries for a child.
///
/// Every query takes an optional child ID; with none selected the answer is
/// `Ok(None)` rather than an error.
#[derive(Clone)]
pub struct SummaryService {
    children: ChildRepository,
    health_logs: HealthLogRepository,
    driving_reports: DrivingReportRepository,
    check_ins: CheckInRepository,
}

impl SummaryService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            children: ChildRepository::new(db.clone()),
            health_logs: HealthLogRepository::new(db.clone()),
            driving_reports: DrivingReportRepository::new(db.clone()),
            check_ins: CheckInRepository::new(db),
        }
    }

    async fn require_child(&self, child_id: &str) -> DomainResult<Child> {
        self.children.get_child(child_id).await?.ok_or_else(|| {
            warn!("Child not found: {}", child_id);
            DomainError::not_found("Child", child_id)
        })
    }

    fn window(end: Option<DateTime<Utc>>) -> DomainResult<SummaryWindow> {
        let end = end.map(truncate_to_millis).unwrap_or_else(now);
        SummaryWindow::ending_at(end).ok_or_else(|| {
            warn!("Summary end out of range: {}", end.to_rfc3339());
            DomainError::validation("Summary end date is out of range")
        })
    }

    pub async fn health_summary(
        &self,
        child_id: Option<&str>,
        end: Option<DateTime<Utc>>,
    ) -> DomainResult<Option<HealthWeeklySummary>> {
        let Some(child_id) = child_id else {
            return Ok(None);
        };
        self.require_child(child_id).await?;
        let window = Self::window(end)?;

        let logs = self
            .health_logs
            .list_in_window(child_id, &window.start, &window.end)
            .await?;
        Ok(Some(summarize_health(&logs, &window)))
    }

    pub async fn driving_summary(
        &self,
        child_id: Option<&str>,
        end: Option<DateTime<Utc>>,
    ) -> DomainResult<Option<DrivingWeeklySummary>> {
        let Some(child_id) = child_id else {
            return Ok(None);
        };
        self.require_child(child_id).await?;
        let window = Self::window(end)?;

        let reports = self
            .driving_reports
            .list_in_window(child_id, &window.start, &window.end)
            .await?;
        Ok(Some(summarize_driving(&reports, &window)))
    }

    /// Health, driving and check-in figures for the seven days ending at
    /// `end` (default now)
    pub async fn weekly_summary(
        &self,
        child_id: Option<&str>,
        end: Option<DateTime<Utc>>,
    ) -> DomainResult<Option<WeeklySummary>> {
        let Some(child_id) = child_id else {
            info!("Weekly summary skipped: no child selected");
            return Ok(None);
        };
        info!("Building weekly summary for child {}", child_id);

        let child = self.require_child(child_id).await?;
        let window = Self::window(end)?;

        let logs = self
            .health_logs
            .list_in_window(&child.id, &window.start, &window.end)
            .await?;
        let reports = self
            .driving_reports
            .list_in_window(&child.id, &window.start, &window.end)
            .await?;
        let check_in_count = self
            .check_ins
            .count_for_child(&child.id, &window.start, &window.end)
            .await?;

        let summary = WeeklySummary {
            child_id: child.id,
            window_start: window.start,
            window_end: window.end,
            health: summarize_health(&logs, &window),
            driving: summarize_driving(&reports, &window),
            check_in_count,
        };

        info!(
            "Weekly summary for {}: {} health entries, {} trips, {} check-ins",
            summary.child_id, summary.health.total_entries, summary.driving.total_trips, check_in_count
        );
        Ok(Some(summary))
    }
}
