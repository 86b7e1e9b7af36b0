//! # Domain Module
//!
//! Business logic for the family hub. Services validate input, call the
//! storage repositories and return `DomainResult`.
//!
//! ## Core engine
//!
//! - **geo / geofence**: haversine distance and the pure enter/leave evaluator
//! - **geofence_service**: evaluates samples and commits state, sample and
//!   alerts atomically
//! - **alert_service**: the family alert inbox
//! - **summary / summary_service**: seven-day health, driving and check-in
//!   summaries
//! - **task_service**: task CRUD and the derived due-state board
//!
//! ## Supporting services
//!
//! - **child_service**, **location_service**, **health_service**,
//!   **driving_service**: CRUD for the entities the engine reads
//! - **text_assist**: AI text helpers behind the `TextCompletion` trait
//! - **notifier**: the `AlertNotifier` collaborator told about new alerts

pub mod alert_service;
pub mod child_service;
pub mod driving_service;
pub mod errors;
pub mod geo;
pub mod geofence;
pub mod geofence_service;
pub mod health_service;
pub mod ids;
pub mod location_service;
pub mod notifier;
pub mod summary;
pub mod summary_service;
pub mod task_service;
pub mod text_assist;

pub use alert_service::AlertService;
pub use child_service::ChildService;
pub use driving_service::DrivingService;
pub use errors::{DomainError, DomainResult};
pub use geofence::FirstSamplePolicy;
pub use geofence_service::GeofenceService;
pub use health_service::HealthService;
pub use location_service::LocationService;
pub use notifier::{AlertNotifier, LogAlertNotifier};
pub use summary_service::SummaryService;
pub use task_service::TaskService;
pub use text_assist::{CompletionError, TextAssistService, TextCompletion};
