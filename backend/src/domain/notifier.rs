use anyhow::Result;
use async_trait::async_trait;
use log::info;
use shared::GeofenceAlert;

/// Receives every alert after it has been committed.
///
/// Delivery failures are logged by the caller and never undo the alert.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &GeofenceAlert) -> Result<()>;
}

/// Default notifier: writes the alert to the log
#[derive(Debug, Default, Clone)]
pub struct LogAlertNotifier;

#[async_trait]
impl AlertNotifier for LogAlertNotifier {
    async fn notify(&self, alert: &GeofenceAlert) -> Result<()> {
        info!(
            "Geofence alert {}: child {} {} location {} at {}",
            alert.id,
            alert.child_id,
            match alert.alert_type {
                shared::AlertType::Enter => "entered",
                shared::AlertType::Leave => "left",
            },
            alert.location_id,
            alert.timestamp.to_rfc3339()
        );
        Ok(())
    }
}
