use log::{info, warn};
use shared::{CreateHealthLogRequest, HealthLog, HealthLogListResponse};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::generate_id;
use crate::storage::time::{now, truncate_to_millis};
use crate::storage::{ChildRepository, DbConnection, HealthLogRepository};

/// Service for meal, sleep, mood, symptom and medicine logs
#[derive(Clone)]
pub struct HealthService {
    logs: HealthLogRepository,
    children: ChildRepository,
}

impl HealthService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            logs: HealthLogRepository::new(db.clone()),
            children: ChildRepository::new(db),
        }
    }

    pub async fn create_log(&self, request: CreateHealthLogRequest) -> DomainResult<HealthLog> {
        info!("Creating {} log for child {}", request.log_type, request.child_id);

        let value = request.value.trim();
        if value.is_empty() {
            return Err(DomainError::validation("Health log value cannot be empty"));
        }

        if self.children.get_child(&request.child_id).await?.is_none() {
            warn!("Child not found: {}", request.child_id);
            return Err(DomainError::not_found("Child", &request.child_id));
        }

        let log = HealthLog {
            id: generate_id("health"),
            child_id: request.child_id,
            log_type: request.log_type,
            value: value.to_string(),
            notes: request.notes,
            timestamp: request.timestamp.map(truncate_to_millis).unwrap_or_else(now),
        };

        self.logs.store_log(&log).await?;
        info!("Stored health log {}", log.id);

        Ok(log)
    }

    /// List logs newest first, for one child when given, otherwise for the
    /// whole family
    pub async fn list_logs(
        &self,
        family_id: Option<&str>,
        child_id: Option<&str>,
    ) -> DomainResult<HealthLogListResponse> {
        let logs = match (child_id, family_id) {
            (Some(child_id), _) => {
                info!("Listing health logs for child {}", child_id);
                self.logs.list_for_child(child_id).await?
            }
            (None, Some(family_id)) if !family_id.trim().is_empty() => {
                info!("Listing health logs for family {}", family_id);
                self.logs.list_for_family(family_id).await?
            }
            _ => {
                return Err(DomainError::validation(
                    "Either family_id or child_id is required",
                ))
            }
        };

        info!("Found {} health logs", logs.len());
        Ok(HealthLogListResponse { logs })
    }

    pub async fn delete_log(&self, log_id: &str) -> DomainResult<()> {
        info!("Deleting health log {}", log_id);

        if !self.logs.delete_log(log_id).await? {
            warn!("Health log not found: {}", log_id);
            return Err(DomainError::not_found("Health log", log_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Child, HealthLogType};

    async fn setup_test() -> HealthService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let ts = now();
        ChildRepository::new(db.clone())
            .store_child(&Child {
                id: "child::1".to_string(),
                family_id: "family::1".to_string(),
                name: "Alice".to_string(),
                birthdate: "2015-06-15".to_string(),
                allergies: vec![],
                notes: None,
                created_at: ts,
                updated_at: ts,
            })
            .await
            .unwrap();
        HealthService::new(db)
    }

    fn request(log_type: HealthLogType, value: &str) -> CreateHealthLogRequest {
        CreateHealthLogRequest {
            child_id: "child::1".to_string(),
            log_type,
            value: value.to_string(),
            notes: None,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let service = setup_test().await;
        let log = service.create_log(request(HealthLogType::Sleep, " 9.5 ")).await.unwrap();
        assert_eq!(log.value, "9.5");

        let by_child = service.list_logs(None, Some("child::1")).await.unwrap();
        let by_family = service.list_logs(Some("family::1"), None).await.unwrap();
        assert_eq!(by_child.logs, vec![log.clone()]);
        assert_eq!(by_family.logs, vec![log]);
    }

    #[tokio::test]
    async fn test_validation() {
        let service = setup_test().await;
        assert!(matches!(
            service.create_log(request(HealthLogType::Meal, "  ")).await,
            Err(DomainError::Validation(_))
        ));

        let mut unknown = request(HealthLogType::Meal, "Pasta");
        unknown.child_id = "child::ghost".to_string();
        assert!(matches!(service.create_log(unknown).await, Err(DomainError::NotFound { .. })));

        assert!(matches!(service.list_logs(None, None).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_log() {
        let service = setup_test().await;
        let log = service.create_log(request(HealthLogType::Mood, "Happy")).await.unwrap();

        service.delete_log(&log.id).await.unwrap();
        assert!(matches!(service.delete_log(&log.id).await, Err(DomainError::NotFound { .. })));
    }
}
