//! # Geofence Service
//!
//! Runs a location sample through the geofence evaluator and commits the
//! result.
//!
//! ## Evaluation flow
//!
//! 1. Validate the sample (coordinates, accuracy). Nothing is written on failure.
//! 2. Load the child, then take the child's evaluation lock so samples for the
//!    same child are processed one at a time inside this process.
//! 3. Load the family's geofence-enabled locations and the child's stored
//!    containment rows (with versions).
//! 4. Evaluate, then commit the sample, the changed rows and the alerts in
//!    one transaction. A version mismatch means another writer got there
//!    first; the commit is abandoned and a `Conflict` error is returned.
//! 5. Hand each committed alert to the [`AlertNotifier`].

use log::{error, info, warn};
use shared::{
    Child, GeofenceAlert, LocationHistoryResponse, LocationSample, LocationSampleRequest,
    SampleEvaluationResponse,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::geo::{validate_accuracy, validate_coordinates};
use crate::domain::geofence::{self, FirstSamplePolicy};
use crate::domain::ids::generate_id;
use crate::domain::notifier::AlertNotifier;
use crate::storage::repositories::{CommitOutcome, EvaluationCommit, StateChange};
use crate::storage::time::{now, truncate_to_millis};
use crate::storage::{ChildRepository, DbConnection, GeofenceRepository, LocationRepository};

/// Location history page size when the caller does not ask for one
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct GeofenceService {
    children: ChildRepository,
    locations: LocationRepository,
    geofence: GeofenceRepository,
    notifier: Arc<dyn AlertNotifier>,
    policy: FirstSamplePolicy,
    child_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl GeofenceService {
    pub fn new(db: DbConnection, notifier: Arc<dyn AlertNotifier>, policy: FirstSamplePolicy) -> Self {
        Self {
            children: ChildRepository::new(db.clone()),
            locations: LocationRepository::new(db.clone()),
            geofence: GeofenceRepository::new(db),
            notifier,
            policy,
            child_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn child_lock(&self, child_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.child_locks.lock().await;
        locks.entry(child_id.to_string()).or_default().clone()
    }

    /// Drop the child's lock entry once no other evaluation holds or awaits it.
    /// Clones are only handed out under the map lock, so the count is stable here.
    async fn release_child_lock(&self, child_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.child_locks.lock().await;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(child_id);
        }
    }

    /// Record a location sample and raise any enter/leave alerts it causes
    pub async fn evaluate_sample(&self, request: LocationSampleRequest) -> DomainResult<SampleEvaluationResponse> {
        info!(
            "Evaluating sample for child {} at ({}, {})",
            request.child_id, request.latitude, request.longitude
        );

        validate_coordinates(request.latitude, request.longitude)?;
        validate_accuracy(request.accuracy_m)?;

        let child = self.children.get_child(&request.child_id).await?.ok_or_else(|| {
            warn!("Sample rejected, child not found: {}", request.child_id);
            DomainError::not_found("Child", &request.child_id)
        })?;

        let lock = self.child_lock(&child.id).await;
        let guard = lock.lock().await;
        let result = self.evaluate_locked(&child, request).await;
        drop(guard);
        self.release_child_lock(&child.id, lock).await;

        result
    }

    async fn evaluate_locked(
        &self,
        child: &Child,
        request: LocationSampleRequest,
    ) -> DomainResult<SampleEvaluationResponse> {
        let locations = self.locations.list_geofenced_locations(&child.family_id).await?;
        let stored = self.geofence.load_containment(&child.id).await?;
        let previous: HashMap<String, bool> = stored
            .iter()
            .map(|(location_id, record)| (location_id.clone(), record.is_inside))
            .collect();

        let evaluation = geofence::evaluate(
            &locations,
            request.latitude,
            request.longitude,
            &previous,
            self.policy,
        );

        let mut state_changes: Vec<StateChange> = evaluation
            .next_state
            .iter()
            .filter_map(|(location_id, &is_inside)| match stored.get(location_id) {
                Some(record) if record.is_inside == is_inside => None,
                Some(record) => Some(StateChange {
                    location_id: location_id.clone(),
                    is_inside,
                    expected_version: Some(record.version),
                }),
                None => Some(StateChange {
                    location_id: location_id.clone(),
                    is_inside,
                    expected_version: None,
                }),
            })
            .collect();
        state_changes.sort_by(|a, b| a.location_id.cmp(&b.location_id));

        let sample = LocationSample {
            id: generate_id("sample"),
            child_id: child.id.clone(),
            timestamp: request.timestamp.map(truncate_to_millis).unwrap_or_else(now),
            latitude: request.latitude,
            longitude: request.longitude,
            accuracy_m: request.accuracy_m,
        };

        let alerts: Vec<GeofenceAlert> = evaluation
            .transitions
            .iter()
            .map(|transition| GeofenceAlert {
                id: generate_id("alert"),
                family_id: child.family_id.clone(),
                child_id: child.id.clone(),
                location_id: transition.location_id.clone(),
                alert_type: transition.alert_type,
                timestamp: sample.timestamp,
                is_read: false,
            })
            .collect();

        let outcome = self
            .geofence
            .commit_evaluation(&EvaluationCommit {
                sample: &sample,
                state_changes: &state_changes,
                alerts: &alerts,
            })
            .await?;

        if let CommitOutcome::Conflict { location_id } = outcome {
            warn!(
                "Containment for child {} at location {} changed during evaluation",
                child.id, location_id
            );
            return Err(DomainError::Conflict(format!(
                "Containment state for location {} changed concurrently; retry the sample",
                location_id
            )));
        }

        for alert in &alerts {
            if let Err(e) = self.notifier.notify(alert).await {
                error!("Failed to deliver alert {}: {}", alert.id, e);
            }
        }

        info!(
            "Stored sample {} for child {}: {} alert(s), {} fence(s) evaluated",
            sample.id,
            child.id,
            alerts.len(),
            evaluation.next_state.len()
        );

        Ok(SampleEvaluationResponse {
            sample,
            alerts,
            containment: evaluation.next_state,
        })
    }

    /// A child's recorded samples, newest first
    pub async fn location_history(&self, child_id: &str, limit: Option<u32>) -> DomainResult<LocationHistoryResponse> {
        info!("Getting location history for child {}", child_id);

        if self.children.get_child(child_id).await?.is_none() {
            warn!("Child not found: {}", child_id);
            return Err(DomainError::not_found("Child", child_id));
        }

        let samples = self
            .geofence
            .list_samples(child_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await?;

        info!("Found {} samples for child {}", samples.len(), child_id);
        Ok(LocationHistoryResponse { samples })
    }
}
