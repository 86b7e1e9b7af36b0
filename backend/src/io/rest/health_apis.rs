//! # REST API for Health Logs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};
use serde::Deserialize;

use super::ApiError;
use crate::AppState;
use shared::CreateHealthLogRequest;

/// `child_id` wins when both are given
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthLogQuery {
    pub family_id: Option<String>,
    pub child_id: Option<String>,
}

pub async fn create_health_log(
    State(state): State<AppState>,
    Json(request): Json<CreateHealthLogRequest>,
) -> impl IntoResponse {
    info!("POST /api/health-logs - request: {:?}", request);

    match state.health_service.create_log(request).await {
        Ok(log) => (StatusCode::CREATED, Json(log)).into_response(),
        Err(e) => {
            error!("Failed to create health log: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_health_logs(State(state): State<AppState>, Query(query): Query<HealthLogQuery>) -> impl IntoResponse {
    info!("GET /api/health-logs - query: {:?}", query);

    match state
        .health_service
        .list_logs(query.family_id.as_deref(), query.child_id.as_deref())
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list health logs: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_health_log(State(state): State<AppState>, Path(log_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/health-logs/{}", log_id);

    match state.health_service.delete_log(&log_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete health log: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{seed_child, test_state};
    use shared::HealthLogType;

    #[tokio::test]
    async fn test_health_log_handlers() {
        let state = test_state().await;
        let child = seed_child(&state, "Alice").await;

        let request = CreateHealthLogRequest {
            child_id: child.id.clone(),
            log_type: HealthLogType::Sleep,
            value: "9.5".to_string(),
            notes: None,
            timestamp: None,
        };
        let response = create_health_log(State(state.clone()), Json(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);

        let query = HealthLogQuery {
            family_id: Some("family::1".to_string()),
            child_id: None,
        };
        let response = list_health_logs(State(state.clone()), Query(query)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let logs = state.health_service.list_logs(None, Some(&child.id)).await.unwrap().logs;
        let response = delete_health_log(State(state.clone()), Path(logs[0].id.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::NO_CONTENT);

        let response = list_health_logs(State(state), Query(HealthLogQuery::default())).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_value_is_rejected() {
        let state = test_state().await;
        let child = seed_child(&state, "Alice").await;

        let request = CreateHealthLogRequest {
            child_id: child.id,
            log_type: HealthLogType::Mood,
            value: "  ".to_string(),
            notes: None,
            timestamp: None,
        };
        let response = create_health_log(State(state), Json(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
