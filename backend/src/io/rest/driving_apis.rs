use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};
use serde::Deserialize;

use super::ApiError;
use crate::AppState;
use shared::CreateDrivingReportRequest;

#[derive(Debug, Clone, Deserialize)]
pub struct ChildQuery {
    pub child_id: String,
}

pub async fn create_driving_report(
    State(state): State<AppState>,
    Json(request): Json<CreateDrivingReportRequest>,
) -> impl IntoResponse {
    info!("POST /api/driving-reports - request: {:?}", request);

    match state.driving_service.create_report(request).await {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(e) => {
            error!("Failed to create driving report: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_driving_reports(State(state): State<AppState>, Query(query): Query<ChildQuery>) -> impl IntoResponse {
    info!("GET /api/driving-reports?child_id={}", query.child_id);

    match state.driving_service.list_reports(&query.child_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list driving reports: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{seed_child, test_state};
    use crate::storage::time::now;

    #[tokio::test]
    async fn test_driving_report_handlers() {
        let state = test_state().await;
        let child = seed_child(&state, "Sam").await;

        let mut request = CreateDrivingReportRequest {
            child_id: child.id.clone(),
            trip_start: now(),
            trip_end: None,
            start_location: "Home".to_string(),
            end_location: "School".to_string(),
            score: 88,
            distance_miles: 4.0,
            max_speed_mph: 35.0,
            hard_braking: 1,
        };
        let response = create_driving_report(State(state.clone()), Json(request.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);

        request.score = 150;
        let response = create_driving_report(State(state.clone()), Json(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);

        let response = list_driving_reports(State(state), Query(ChildQuery { child_id: child.id })).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
    }
}
