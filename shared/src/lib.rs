use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

/// Child ID in format: "child::<uuid>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    /// Family this child belongs to
    pub family_id: String,
    pub name: String,
    /// Birthdate in YYYY-MM-DD format
    pub birthdate: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChildRequest {
    pub family_id: String,
    pub name: String,
    pub birthdate: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateChildRequest {
    pub name: Option<String>,
    pub birthdate: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildResponse {
    pub child: Child,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildListResponse {
    pub children: Vec<Child>,
}

// ---------------------------------------------------------------------------
// Locations and check-ins
// ---------------------------------------------------------------------------

/// Kind of place a location represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LocationCategory {
    Home,
    School,
    Work,
    Friend,
    Activity,
    #[default]
    Other,
}

/// A named place owned by a family, optionally guarded by a circular geofence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub address: Option<String>,
    pub category: LocationCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub geofence_enabled: bool,
    /// Geofence radius in meters; always present and positive when the geofence is enabled
    pub geofence_radius_m: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLocationRequest {
    pub family_id: String,
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub category: LocationCategory,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub geofence_enabled: bool,
    pub geofence_radius_m: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub category: Option<LocationCategory>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geofence_enabled: Option<bool>,
    pub geofence_radius_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResponse {
    pub location: Location,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationListResponse {
    pub locations: Vec<Location>,
}

/// Manually recorded presence at a location. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub location_id: String,
    pub child_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCheckInRequest {
    pub location_id: String,
    pub child_id: Option<String>,
    pub notes: Option<String>,
    /// Defaults to the current time
    pub timestamp: Option<DateTime<Utc>>,
}

/// Check-in joined with the names needed to display it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInView {
    #[serde(flatten)]
    pub check_in: CheckIn,
    pub location_name: String,
    pub child_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInListResponse {
    pub check_ins: Vec<CheckInView>,
}

// ---------------------------------------------------------------------------
// Location samples and geofence alerts
// ---------------------------------------------------------------------------

/// A position report from a child's device. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub id: String,
    pub child_id: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy in meters
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSampleRequest {
    pub child_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Defaults to the current time
    pub timestamp: Option<DateTime<Utc>>,
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationHistoryResponse {
    pub samples: Vec<LocationSample>,
}

/// Direction of a geofence boundary crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertType {
    Enter,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceAlert {
    pub id: String,
    pub family_id: String,
    pub child_id: String,
    pub location_id: String,
    pub alert_type: AlertType,
    /// Timestamp of the sample that caused the crossing
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

/// Alert joined with the names needed to display it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceAlertView {
    #[serde(flatten)]
    pub alert: GeofenceAlert,
    pub child_name: String,
    pub location_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertListResponse {
    pub alerts: Vec<GeofenceAlertView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAlertReadResponse {
    pub alert: GeofenceAlert,
    /// False when the alert was already read
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated_count: u32,
}

/// Result of evaluating one location sample against a family's geofences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEvaluationResponse {
    pub sample: LocationSample,
    pub alerts: Vec<GeofenceAlert>,
    /// Location ID -> whether the child is now inside that geofence
    pub containment: HashMap<String, bool>,
}

// ---------------------------------------------------------------------------
// Health logs and driving reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthLogType {
    Meal,
    Sleep,
    Mood,
    Symptom,
    Medicine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthLog {
    pub id: String,
    pub child_id: String,
    #[serde(rename = "type")]
    pub log_type: HealthLogType,
    /// Free text; number of hours for sleep entries
    pub value: String,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHealthLogRequest {
    pub child_id: String,
    #[serde(rename = "type")]
    pub log_type: HealthLogType,
    pub value: String,
    pub notes: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthLogListResponse {
    pub logs: Vec<HealthLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingReport {
    pub id: String,
    pub child_id: String,
    pub trip_start: DateTime<Utc>,
    pub trip_end: Option<DateTime<Utc>>,
    pub start_location: String,
    pub end_location: String,
    /// Driving score from 0 to 100
    pub score: u32,
    pub distance_miles: f64,
    pub max_speed_mph: f64,
    pub hard_braking: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDrivingReportRequest {
    pub child_id: String,
    pub trip_start: DateTime<Utc>,
    pub trip_end: Option<DateTime<Utc>>,
    pub start_location: String,
    pub end_location: String,
    pub score: u32,
    pub distance_miles: f64,
    pub max_speed_mph: f64,
    #[serde(default)]
    pub hard_braking: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingReportListResponse {
    pub reports: Vec<DrivingReport>,
}

// ---------------------------------------------------------------------------
// Weekly summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthWeeklySummary {
    pub total_entries: u32,
    pub meal_count: u32,
    pub sleep_count: u32,
    pub mood_count: u32,
    pub symptom_count: u32,
    pub medicine_count: u32,
    /// Mood entries in the window, newest first
    pub mood_entries: Vec<HealthLog>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrivingWeeklySummary {
    pub total_trips: u32,
    /// Mean trip score rounded to the nearest integer
    pub avg_score: u32,
    pub total_distance: f64,
    pub max_speed: f64,
    pub hard_braking_events: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub child_id: String,
    /// Exclusive lower bound of the window
    pub window_start: DateTime<Utc>,
    /// Inclusive upper bound of the window
    pub window_end: DateTime<Utc>,
    pub health: HealthWeeklySummary,
    pub driving: DrivingWeeklySummary,
    pub check_in_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummaryResponse {
    pub summary: Option<WeeklySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummaryResponse {
    pub summary: Option<HealthWeeklySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingSummaryResponse {
    pub summary: Option<DrivingWeeklySummary>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskCategory {
    Feeding,
    Napping,
    Medicine,
    Activity,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub family_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    /// Child the task is about, if any
    pub child_id: Option<String>,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub recurrence: Option<Recurrence>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived on every read from the completed flag and the due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskDueState {
    Overdue,
    Upcoming,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTask {
    #[serde(flatten)]
    pub task: Task,
    pub due_state: TaskDueState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBoard {
    /// Oldest due date first
    pub overdue: Vec<ClassifiedTask>,
    /// Soonest due date first
    pub upcoming: Vec<ClassifiedTask>,
    /// Most recently updated first
    pub completed: Vec<ClassifiedTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub family_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub child_id: Option<String>,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub priority: TaskPriority,
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub child_id: Option<String>,
    pub category: Option<TaskCategory>,
    pub priority: Option<TaskPriority>,
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task: ClassifiedTask,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Text assist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectTextRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectTextResponse {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateHealthInputRequest {
    #[serde(rename = "type")]
    pub log_type: HealthLogType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInputValidation {
    pub is_valid: bool,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysisResponse {
    pub child_id: String,
    /// Absent when no analysis could be produced
    pub analysis: Option<String>,
}
