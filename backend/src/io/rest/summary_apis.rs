//! # REST API for Weekly Summaries
//!
//! Summaries cover the seven days ending at `end` (default now). A request
//! without a `child_id` is answered with an empty `summary`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Deserialize;

use super::ApiError;
use crate::AppState;
use shared::{DrivingSummaryResponse, HealthSummaryResponse, WeeklySummaryResponse};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    pub child_id: Option<String>,
    pub end: Option<DateTime<Utc>>,
}

pub async fn get_weekly_summary(State(state): State<AppState>, Query(query): Query<SummaryQuery>) -> impl IntoResponse {
    info!("GET /api/summaries/weekly - query: {:?}", query);

    match state
        .summary_service
        .weekly_summary(query.child_id.as_deref(), query.end)
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(WeeklySummaryResponse { summary })).into_response(),
        Err(e) => {
            error!("Failed to build weekly summary: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_health_summary(State(state): State<AppState>, Query(query): Query<SummaryQuery>) -> impl IntoResponse {
    info!("GET /api/summaries/health - query: {:?}", query);

    match state
        .summary_service
        .health_summary(query.child_id.as_deref(), query.end)
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(HealthSummaryResponse { summary })).into_response(),
        Err(e) => {
            error!("Failed to build health summary: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_driving_summary(State(state): State<AppState>, Query(query): Query<SummaryQuery>) -> impl IntoResponse {
    info!("GET /api/summaries/driving - query: {:?}", query);

    match state
        .summary_service
        .driving_summary(query.child_id.as_deref(), query.end)
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(DrivingSummaryResponse { summary })).into_response(),
        Err(e) => {
            error!("Failed to build driving summary: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{seed_child, test_state};

    #[tokio::test]
    async fn test_summary_handlers() {
        let state = test_state().await;
        let child = seed_child(&state, "Alice").await;

        let query = SummaryQuery {
            child_id: Some(child.id),
            end: None,
        };
        let response = get_weekly_summary(State(state.clone()), Query(query.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
        let response = get_health_summary(State(state.clone()), Query(query.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
        let response = get_driving_summary(State(state.clone()), Query(query)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        // No child selected is not an error
        let response = get_weekly_summary(State(state.clone()), Query(SummaryQuery::default())).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let unknown = SummaryQuery {
            child_id: Some("child::ghost".to_string()),
            end: None,
        };
        let response = get_weekly_summary(State(state), Query(unknown)).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_extreme_end_is_a_bad_request() {
        let state = test_state().await;
        let child = seed_child(&state, "Alice").await;

        let end = DateTime::<Utc>::MIN_UTC + chrono::Duration::days(1);
        let query = SummaryQuery {
            child_id: Some(child.id),
            end: Some(end),
        };
        let response = get_weekly_summary(State(state), Query(query)).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
