//! # REST API for the Alert Inbox

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::{ApiError, FamilyLimitQuery, FamilyQuery};
use crate::AppState;

/// List a family's alerts, newest first
pub async fn list_alerts(State(state): State<AppState>, Query(query): Query<FamilyLimitQuery>) -> impl IntoResponse {
    info!("GET /api/alerts?family_id={}&limit={:?}", query.family_id, query.limit);

    match state.alert_service.list_alerts(&query.family_id, query.limit).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list alerts: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_unread_count(State(state): State<AppState>, Query(query): Query<FamilyQuery>) -> impl IntoResponse {
    info!("GET /api/alerts/unread-count?family_id={}", query.family_id);

    match state.alert_service.unread_count(&query.family_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to count unread alerts: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn mark_alert_read(State(state): State<AppState>, Path(alert_id): Path<String>) -> impl IntoResponse {
    info!("POST /api/alerts/{}/read", alert_id);

    match state.alert_service.mark_read(&alert_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to mark alert read: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn mark_all_alerts_read(State(state): State<AppState>, Query(query): Query<FamilyQuery>) -> impl IntoResponse {
    info!("POST /api/alerts/read-all?family_id={}", query.family_id);

    match state.alert_service.mark_all_read(&query.family_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to mark alerts read: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
