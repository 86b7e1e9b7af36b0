//! # REST API for Tasks
//!
//! `GET /tasks` returns the family's board with every task classified as
//! overdue, upcoming or completed at request time.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::{ApiError, FamilyQuery};
use crate::AppState;
use shared::{CreateTaskRequest, UpdateTaskRequest};

pub async fn get_task_board(State(state): State<AppState>, Query(query): Query<FamilyQuery>) -> impl IntoResponse {
    info!("GET /api/tasks?family_id={}", query.family_id);

    match state.task_service.task_board(&query.family_id).await {
        Ok(board) => (StatusCode::OK, Json(board)).into_response(),
        Err(e) => {
            error!("Failed to build task board: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn create_task(State(state): State<AppState>, Json(request): Json<CreateTaskRequest>) -> impl IntoResponse {
    info!("POST /api/tasks - request: {:?}", request);

    match state.task_service.create_task(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to create task: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    info!("PUT /api/tasks/{} - request: {:?}", task_id, request);

    match state.task_service.update_task(&task_id, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to update task: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Flip a task between completed and not completed
pub async fn toggle_task(State(state): State<AppState>, Path(task_id): Path<String>) -> impl IntoResponse {
    info!("POST /api/tasks/{}/toggle", task_id);

    match state.task_service.toggle_task(&task_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to toggle task: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_task(State(state): State<AppState>, Path(task_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/tasks/{}", task_id);

    match state.task_service.delete_task(&task_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete task: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::test_state;
    use crate::storage::time::now;
    use chrono::Duration;
    use shared::{TaskCategory, TaskDueState, TaskPriority};

    fn request(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            family_id: "family::1".to_string(),
            title: title.to_string(),
            description: None,
            due_date: now() - Duration::hours(2),
            child_id: None,
            category: TaskCategory::Medicine,
            priority: TaskPriority::High,
            recurrence: None,
        }
    }

    #[tokio::test]
    async fn test_task_lifecycle_handlers() {
        let state = test_state().await;

        let response = create_task(State(state.clone()), Json(request("Give antibiotics"))).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);

        let board = state.task_service.task_board("family::1").await.unwrap();
        assert_eq!(board.overdue.len(), 1);
        let task_id = board.overdue[0].task.id.clone();

        let update = UpdateTaskRequest {
            title: Some("Give antibiotics (evening)".to_string()),
            ..UpdateTaskRequest::default()
        };
        let response = update_task(State(state.clone()), Path(task_id.clone()), Json(update)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let response = toggle_task(State(state.clone()), Path(task_id.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
        let board = state.task_service.task_board("family::1").await.unwrap();
        assert_eq!(board.completed[0].due_state, TaskDueState::Completed);

        let query = FamilyQuery {
            family_id: "family::1".to_string(),
        };
        let response = get_task_board(State(state.clone()), Query(query)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let response = delete_task(State(state.clone()), Path(task_id.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::NO_CONTENT);

        let response = toggle_task(State(state), Path(task_id)).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_task_validation_error() {
        let state = test_state().await;
        let response = create_task(State(state), Json(request(""))).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
