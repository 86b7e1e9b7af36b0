use log::{info, warn};
use shared::{AlertListResponse, MarkAlertReadResponse, MarkAllReadResponse, UnreadCountResponse};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::validate_family_id;
use crate::storage::{AlertRepository, DbConnection};

/// Service behind the family alert inbox
#[derive(Clone)]
pub struct AlertService {
    alerts: AlertRepository,
}

impl AlertService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            alerts: AlertRepository::new(db),
        }
    }

    /// List a family's alerts, newest first
    pub async fn list_alerts(&self, family_id: &str, limit: Option<u32>) -> DomainResult<AlertListResponse> {
        info!("Listing alerts for family {} (limit: {:?})", family_id, limit);
        validate_family_id(family_id)?;

        let alerts = self.alerts.list_for_family(family_id, limit).await?;

        info!("Found {} alerts for family {}", alerts.len(), family_id);
        Ok(AlertListResponse { alerts })
    }

    /// Mark one alert as read. Marking an already-read alert is a no-op
    /// reported with `changed: false`.
    pub async fn mark_read(&self, alert_id: &str) -> DomainResult<MarkAlertReadResponse> {
        info!("Marking alert {} as read", alert_id);

        let mut alert = self.alerts.get_alert(alert_id).await?.ok_or_else(|| {
            warn!("Alert not found: {}", alert_id);
            DomainError::not_found("Alert", alert_id)
        })?;

        let changed = self.alerts.mark_read(alert_id).await?;
        alert.is_read = true;

        Ok(MarkAlertReadResponse { alert, changed })
    }

    pub async fn unread_count(&self, family_id: &str) -> DomainResult<UnreadCountResponse> {
        validate_family_id(family_id)?;
        let unread_count = self.alerts.unread_count(family_id).await?;
        info!("Family {} has {} unread alerts", family_id, unread_count);
        Ok(UnreadCountResponse { unread_count })
    }

    pub async fn mark_all_read(&self, family_id: &str) -> DomainResult<MarkAllReadResponse> {
        info!("Marking all alerts read for family {}", family_id);
        validate_family_id(family_id)?;

        let updated_count = self.alerts.mark_all_read(family_id).await?;

        info!("Marked {} alerts read for family {}", updated_count, family_id);
        Ok(MarkAllReadResponse { updated_count })
    }
}
