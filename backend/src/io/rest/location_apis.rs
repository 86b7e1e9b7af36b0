//! # REST API for Locations and Check-ins

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::{ApiError, FamilyLimitQuery, FamilyQuery};
use crate::AppState;
use shared::{CreateCheckInRequest, CreateLocationRequest, UpdateLocationRequest};

pub async fn create_location(
    State(state): State<AppState>,
    Json(request): Json<CreateLocationRequest>,
) -> impl IntoResponse {
    info!("POST /api/locations - request: {:?}", request);

    match state.location_service.create_location(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to create location: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_location(State(state): State<AppState>, Path(location_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/locations/{}", location_id);

    match state.location_service.get_location(&location_id).await {
        Ok(location) => (StatusCode::OK, Json(location)).into_response(),
        Err(e) => {
            error!("Failed to get location: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_locations(State(state): State<AppState>, Query(query): Query<FamilyQuery>) -> impl IntoResponse {
    info!("GET /api/locations?family_id={}", query.family_id);

    match state.location_service.list_locations(&query.family_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list locations: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Update a location, including its geofence settings
pub async fn update_location(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
    Json(request): Json<UpdateLocationRequest>,
) -> impl IntoResponse {
    info!("PUT /api/locations/{} - request: {:?}", location_id, request);

    match state.location_service.update_location(&location_id, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to update location: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_location(State(state): State<AppState>, Path(location_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/locations/{}", location_id);

    match state.location_service.delete_location(&location_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete location: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn create_check_in(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckInRequest>,
) -> impl IntoResponse {
    info!("POST /api/check-ins - request: {:?}", request);

    match state.location_service.check_in(request).await {
        Ok(check_in) => (StatusCode::CREATED, Json(check_in)).into_response(),
        Err(e) => {
            error!("Failed to record check-in: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Most recent check-ins for a family, newest first
pub async fn list_check_ins(
    State(state): State<AppState>,
    Query(query): Query<FamilyLimitQuery>,
) -> impl IntoResponse {
    info!("GET /api/check-ins?family_id={}&limit={:?}", query.family_id, query.limit);

    match state
        .location_service
        .recent_check_ins(&query.family_id, query.limit)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list check-ins: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
