//! # REST API for Text Assist
//!
//! These endpoints never fail because of the completion backend; they fall
//! back to the neutral answer instead.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::ApiError;
use crate::AppState;
use shared::{CorrectTextRequest, CorrectTextResponse, TrendAnalysisResponse, ValidateHealthInputRequest};

pub async fn correct_text(State(state): State<AppState>, Json(request): Json<CorrectTextRequest>) -> impl IntoResponse {
    info!("POST /api/assist/correct ({} chars)", request.text.len());

    let text = state.text_assist_service.capitalize_and_correct(&request.text).await;
    (StatusCode::OK, Json(CorrectTextResponse { text }))
}

pub async fn validate_health_input(
    State(state): State<AppState>,
    Json(request): Json<ValidateHealthInputRequest>,
) -> impl IntoResponse {
    info!("POST /api/assist/validate-health - type: {}", request.log_type);

    let validation = state
        .text_assist_service
        .validate_health_input(request.log_type, &request.value)
        .await;
    (StatusCode::OK, Json(validation))
}

pub async fn get_trend_analysis(State(state): State<AppState>, Path(child_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/assist/trends/{}", child_id);

    match state.text_assist_service.trend_analysis(&child_id).await {
        Ok(analysis) => (StatusCode::OK, Json(TrendAnalysisResponse { child_id, analysis })).into_response(),
        Err(e) => {
            error!("Failed to analyze trends: {}", e);
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
    async fn test_assist_handlers_without_backend() {
        let state = test_state().await;
        let child = seed_child(&state, "Alice").await;

        let response = correct_text(
            State(state.clone()),
            Json(CorrectTextRequest {
                text: "oak park".to_string(),
            }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let response = validate_health_input(
            State(state.clone()),
            Json(ValidateHealthInputRequest {
                log_type: HealthLogType::Mood,
                value: "happy".to_string(),
            }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let response = get_trend_analysis(State(state.clone()), Path(child.id)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let response = get_trend_analysis(State(state), Path("child::ghost".to_string())).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }
}
