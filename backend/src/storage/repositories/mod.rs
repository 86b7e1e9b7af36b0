pub mod alert_repository;
pub mod check_in_repository;
pub mod child_repository;
pub mod driving_report_repository;
pub mod geofence_repository;
pub mod health_log_repository;
pub mod location_repository;
pub mod task_repository;

pub use alert_repository::AlertRepository;
pub use check_in_repository::CheckInRepository;
pub use child_repository::ChildRepository;
pub use driving_report_repository::DrivingReportRepository;
pub use geofence_repository::{
    CommitOutcome, ContainmentRecord, EvaluationCommit, GeofenceRepository, StateChange,
};
pub use health_log_repository::HealthLogRepository;
pub use location_repository::LocationRepository;
pub use task_repository::TaskRepository;
