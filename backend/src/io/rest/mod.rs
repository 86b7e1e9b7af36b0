//! # REST API Interface Layer
//!
//! HTTP endpoints for the family hub. Handlers log the request, call one
//! domain service and translate `DomainError` into a status code with a JSON
//! `{ "error", "code" }` body. No business rules live here.

pub mod alert_apis;
pub mod assist_apis;
pub mod child_apis;
pub mod driving_apis;
pub mod error;
pub mod geofence_apis;
pub mod health_apis;
pub mod location_apis;
pub mod summary_apis;
pub mod task_apis;

use serde::Deserialize;

pub use alert_apis::*;
pub use assist_apis::*;
pub use child_apis::*;
pub use driving_apis::*;
pub use error::ApiError;
pub use geofence_apis::*;
pub use health_apis::*;
pub use location_apis::*;
pub use summary_apis::*;
pub use task_apis::*;

#[derive(Debug, Clone, Deserialize)]
pub struct FamilyQuery {
    pub family_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FamilyLimitQuery {
    pub family_id: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}
