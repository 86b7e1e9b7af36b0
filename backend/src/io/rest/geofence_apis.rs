//! # REST API for Location Samples
//!
//! Devices post position samples here. Each sample is evaluated against the
//! family's geofences and the resulting alerts are returned with it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::{ApiError, LimitQuery};
use crate::AppState;
use shared::LocationSampleRequest;

/// Evaluate a location sample
pub async fn submit_location_sample(
    State(state): State<AppState>,
    Json(request): Json<LocationSampleRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/location-samples - child: {}, lat: {}, lon: {}",
        request.child_id, request.latitude, request.longitude
    );

    match state.geofence_service.evaluate_sample(request).await {
        Ok(response) => {
            info!("Sample {} produced {} alerts", response.sample.id, response.alerts.len());
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to evaluate location sample: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_location_history(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    info!("GET /api/children/{}/location-history?limit={:?}", child_id, query.limit);

    match state.geofence_service.location_history(&child_id, query.limit).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to get location history: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{seed_child, seed_fenced_location, test_state};

    fn sample(child_id: &str, latitude: f64) -> LocationSampleRequest {
        LocationSampleRequest {
            child_id: child_id.to_string(),
            latitude,
            longitude: 0.0,
            timestamp: None,
            accuracy_m: Some(10.0),
        }
    }

    #[tokio::test]
    async fn test_submit_sample_handler() {
        let state = test_state().await;
        let child = seed_child(&state, "Alice").await;
        seed_fenced_location(&state, "School").await;

        let response = submit_location_sample(State(state.clone()), Json(sample(&child.id, 0.0))).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);

        let response = get_location_history(
            State(state),
            Path(child.id),
            Query(LimitQuery { limit: Some(10) }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_submit_sample_errors() {
        let state = test_state().await;
        let child = seed_child(&state, "Alice").await;

        let response = submit_location_sample(State(state.clone()), Json(sample(&child.id, 91.0))).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);

        let response = submit_location_sample(State(state), Json(sample("child::ghost", 0.0))).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }
}
