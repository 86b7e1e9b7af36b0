//! # Storage Module
//!
//! Handles all data persistence for the family hub.
//!
//! Every table is owned by one repository. Repositories share a single
//! [`DbConnection`] (an SQLite pool managed through SQLx) and return
//! `anyhow::Result`; the domain layer turns those failures into
//! `DomainError::Storage`.
//!
//! ## Components
//!
//! - **connection.rs**: pool setup and schema creation
//! - **time.rs**: epoch-millisecond timestamp conversions
//! - **repositories/**: one repository per entity, plus the geofence
//!   repository that commits an evaluation (sample, state rows, alerts) in a
//!   single transaction

pub mod connection;
pub mod repositories;
pub mod time;

pub use connection::DbConnection;
pub use repositories::{
    AlertRepository, CheckInRepository, ChildRepository, DrivingReportRepository,
    GeofenceRepository, HealthLogRepository, LocationRepository, TaskRepository,
};
