//! # Family Hub Backend
//!
//! Geofence, alert and summary engine behind the family hub app.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, completion client)
//!     ↓
//! Domain Layer (services, geofence evaluator, summaries)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! `initialize_backend` wires the services from an `AppConfig` and
//! `create_router` exposes them under `/api`.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::domain::{
    AlertNotifier, AlertService, ChildService, DrivingService, FirstSamplePolicy, GeofenceService, HealthService,
    LocationService, LogAlertNotifier, SummaryService, TaskService, TextAssistService, TextCompletion,
};
use crate::io::ChatCompletionClient;
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub child_service: ChildService,
    pub location_service: LocationService,
    pub geofence_service: GeofenceService,
    pub alert_service: AlertService,
    pub summary_service: SummaryService,
    pub task_service: TaskService,
    pub health_service: HealthService,
    pub driving_service: DrivingService,
    pub text_assist_service: TextAssistService,
}

impl AppState {
    pub fn new(
        db: DbConnection,
        notifier: Arc<dyn AlertNotifier>,
        policy: FirstSamplePolicy,
        completion: Option<Arc<dyn TextCompletion>>,
    ) -> Self {
        Self {
            child_service: ChildService::new(db.clone()),
            location_service: LocationService::new(db.clone()),
            geofence_service: GeofenceService::new(db.clone(), notifier, policy),
            alert_service: AlertService::new(db.clone()),
            summary_service: SummaryService::new(db.clone()),
            task_service: TaskService::new(db.clone()),
            health_service: HealthService::new(db.clone()),
            driving_service: DrivingService::new(db.clone()),
            text_assist_service: TextAssistService::new(db, completion),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database.url);
    let db_conn = DbConnection::init(&config.database).await?;

    let completion: Option<Arc<dyn TextCompletion>> = match ChatCompletionClient::from_config(&config.assist)? {
        Some(client) => {
            info!("Text assist enabled (model: {})", config.assist.model);
            Some(Arc::new(client) as Arc<dyn TextCompletion>)
        }
        None => {
            info!("Text assist disabled: no API key configured");
            None
        }
    };

    info!(
        "Setting up domain model (first sample policy: {})",
        config.geofence.first_sample_policy
    );
    let app_state = AppState::new(
        db_conn,
        Arc::new(LogAlertNotifier),
        config.geofence.first_sample_policy,
        completion,
    );

    Ok(app_state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    match origin.map(|o| o.parse::<HeaderValue>()) {
        Some(Ok(value)) => cors.allow_origin(value),
        Some(Err(e)) => {
            warn!("Invalid CORS origin, allowing any origin: {}", e);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: Option<&str>) -> Router {
    let api_routes = Router::new()
        .route("/children", get(io::list_children).post(io::create_child))
        .route(
            "/children/:id",
            get(io::get_child).put(io::update_child).delete(io::delete_child),
        )
        .route("/children/:id/location-history", get(io::get_location_history))
        .route("/locations", get(io::list_locations).post(io::create_location))
        .route(
            "/locations/:id",
            get(io::get_location).put(io::update_location).delete(io::delete_location),
        )
        .route("/check-ins", get(io::list_check_ins).post(io::create_check_in))
        .route("/location-samples", post(io::submit_location_sample))
        .route("/alerts", get(io::list_alerts))
        .route("/alerts/unread-count", get(io::get_unread_count))
        .route("/alerts/read-all", post(io::mark_all_alerts_read))
        .route("/alerts/:id/read", post(io::mark_alert_read))
        .route("/summaries/weekly", get(io::get_weekly_summary))
        .route("/summaries/health", get(io::get_health_summary))
        .route("/summaries/driving", get(io::get_driving_summary))
        .route("/tasks", get(io::get_task_board).post(io::create_task))
        .route("/tasks/:id", put(io::update_task).delete(io::delete_task))
        .route("/tasks/:id/toggle", post(io::toggle_task))
        .route("/health-logs", get(io::list_health_logs).post(io::create_health_log))
        .route("/health-logs/:id", delete(io::delete_health_log))
        .route(
            "/driving-reports",
            get(io::list_driving_reports).post(io::create_driving_report),
        )
        .route("/assist/correct", post(io::correct_text))
        .route("/assist/validate-health", post(io::validate_health_input))
        .route("/assist/trends/:child_id", get(io::get_trend_analysis));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::io::rest::test_support::{seed_child, test_state};

    #[tokio::test]
    async fn test_router_serves_api_routes() {
        let state = test_state().await;
        let child = seed_child(&state, "Alice").await;
        let app = create_router(state, Some("http://localhost:5173"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/children/{}", child.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/alerts/unread-count?family_id=family::1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/location-samples")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"child_id":"{}","latitude":120.0,"longitude":0.0}}"#,
                        child.id
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_initialize_backend_without_assist() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", dir.path().join("hub.db").display());

        let state = initialize_backend(&config).await.unwrap();
        let children = state.child_service.list_children("family::1").await.unwrap();
        assert!(children.children.is_empty());
    }
}
