//! # REST API for Child Management
//!
//! Endpoints for creating, retrieving, updating, and deleting children.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::{ApiError, FamilyQuery};
use crate::AppState;
use shared::{CreateChildRequest, UpdateChildRequest};

/// Create a new child
pub async fn create_child(
    State(state): State<AppState>,
    Json(request): Json<CreateChildRequest>,
) -> impl IntoResponse {
    info!("POST /api/children - request: {:?}", request);

    match state.child_service.create_child(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to create child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Get a child by ID
pub async fn get_child(State(state): State<AppState>, Path(child_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/children/{}", child_id);

    match state.child_service.get_child(&child_id).await {
        Ok(child) => (StatusCode::OK, Json(child)).into_response(),
        Err(e) => {
            error!("Failed to get child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// List a family's children
pub async fn list_children(State(state): State<AppState>, Query(query): Query<FamilyQuery>) -> impl IntoResponse {
    info!("GET /api/children?family_id={}", query.family_id);

    match state.child_service.list_children(&query.family_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list children: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_child(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Json(request): Json<UpdateChildRequest>,
) -> impl IntoResponse {
    info!("PUT /api/children/{} - request: {:?}", child_id, request);

    match state.child_service.update_child(&child_id, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to update child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_child(State(state): State<AppState>, Path(child_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/children/{}", child_id);

    match state.child_service.delete_child(&child_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
