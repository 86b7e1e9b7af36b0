use log::{info, warn};
use shared::{CreateDrivingReportRequest, DrivingReport, DrivingReportListResponse};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::generate_id;
use crate::storage::time::truncate_to_millis;
use crate::storage::{ChildRepository, DbConnection, DrivingReportRepository};

#[derive(Clone)]
pub struct DrivingService {
    reports: DrivingReportRepository,
    children: ChildRepository,
}

impl DrivingService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            reports: DrivingReportRepository::new(db.clone()),
            children: ChildRepository::new(db),
        }
    }

    pub async fn create_report(&self, request: CreateDrivingReportRequest) -> DomainResult<DrivingReport> {
        info!("Creating driving report for child {}", request.child_id);

        validate_report(&request)?;

        if self.children.get_child(&request.child_id).await?.is_none() {
            warn!("Child not found: {}", request.child_id);
            return Err(DomainError::not_found("Child", &request.child_id));
        }

        let report = DrivingReport {
            id: generate_id("driving"),
            child_id: request.child_id,
            trip_start: truncate_to_millis(request.trip_start),
            trip_end: request.trip_end.map(truncate_to_millis),
            start_location: request.start_location.trim().to_string(),
            end_location: request.end_location.trim().to_string(),
            score: request.score,
            distance_miles: request.distance_miles,
            max_speed_mph: request.max_speed_mph,
            hard_braking: request.hard_braking,
        };

        self.reports.store_report(&report).await?;
        info!("Stored driving report {} (score {})", report.id, report.score);

        Ok(report)
    }

    /// A child's trips, most recent first
    pub async fn list_reports(&self, child_id: &str) -> DomainResult<DrivingReportListResponse> {
        info!("Listing driving reports for child {}", child_id);

        let reports = self.reports.list_for_child(child_id).await?;

        info!("Found {} driving reports", reports.len());
        Ok(DrivingReportListResponse { reports })
    }
}

fn validate_report(request: &CreateDrivingReportRequest) -> DomainResult<()> {
    if request.score > 100 {
        return Err(DomainError::validation("Score must be between 0 and 100"));
    }
    if !request.distance_miles.is_finite() || request.distance_miles < 0.0 {
        return Err(DomainError::validation("Distance must be a non-negative number"));
    }
    if !request.max_speed_mph.is_finite() || request.max_speed_mph < 0.0 {
        return Err(DomainError::validation("Max speed must be a non-negative number"));
    }
    if let Some(trip_end) = request.trip_end {
        if trip_end < request.trip_start {
            return Err(DomainError::validation("Trip end cannot be before trip start"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::time::now;
    use chrono::Duration;
    use shared::Child;

    async fn setup_test() -> DrivingService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let ts = now();
        ChildRepository::new(db.clone())
            .store_child(&Child {
                id: "child::teen".to_string(),
                family_id: "family::1".to_string(),
                name: "Sam".to_string(),
                birthdate: "2008-02-01".to_string(),
                allergies: vec![],
                notes: None,
                created_at: ts,
                updated_at: ts,
            })
            .await
            .unwrap();
        DrivingService::new(db)
    }

    fn request(score: u32) -> CreateDrivingReportRequest {
        let start = now() - Duration::hours(1);
        CreateDrivingReportRequest {
            child_id: "child::teen".to_string(),
            trip_start: start,
            trip_end: Some(start + Duration::minutes(25)),
            start_location: "Home".to_string(),
            end_location: "Practice".to_string(),
            score,
            distance_miles: 8.2,
            max_speed_mph: 48.0,
            hard_braking: 0,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let service = setup_test().await;
        let report = service.create_report(request(92)).await.unwrap();

        let listed = service.list_reports("child::teen").await.unwrap();
        assert_eq!(listed.reports, vec![report]);
    }

    #[tokio::test]
    async fn test_validation() {
        let service = setup_test().await;
        assert!(matches!(service.create_report(request(101)).await, Err(DomainError::Validation(_))));

        let mut negative = request(80);
        negative.distance_miles = -1.0;
        assert!(service.create_report(negative).await.is_err());

        let mut backwards = request(80);
        backwards.trip_end = Some(backwards.trip_start - Duration::minutes(1));
        assert!(service.create_report(backwards).await.is_err());

        let mut unknown = request(80);
        unknown.child_id = "child::ghost".to_string();
        assert!(matches!(service.create_report(unknown).await, Err(DomainError::NotFound { .. })));
    }
}
