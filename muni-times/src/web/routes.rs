//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::monitor::{MonitorError, MonitorStatus};

use super::dto::*;
use super::state::AppState;
use super::templates::BoardTemplate;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(board_page))
        .route("/health", get(health))
        .route("/schedule", get(schedule))
        .route("/control/status", get(status))
        .route("/control/fetch", post(fetch_now))
        .route("/control/stop", post(stop))
        .route("/control/restart", post(restart))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Arrival board page.
async fn board_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let stops = state.monitor.latest().map(|update| {
        update
            .schedule
            .iter()
            .map(StopView::from_entry)
            .collect::<Vec<_>>()
    });

    let html = BoardTemplate::new(stops)
        .render()
        .map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;
    Ok(Html(html))
}

/// Latest schedule as JSON.
async fn schedule(State(state): State<AppState>) -> Json<ScheduleResponse> {
    let latest = state.monitor.latest();
    Json(ScheduleResponse::from_update(latest.as_deref()))
}

async fn status(State(state): State<AppState>) -> Result<Json<MonitorStatus>, AppError> {
    Ok(Json(state.monitor.status().await?))
}

async fn fetch_now(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.monitor.fetch_now().await?;
    Ok(StatusCode::ACCEPTED)
}

async fn stop(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.monitor.stop().await?;
    Ok(StatusCode::ACCEPTED)
}

async fn restart(
    State(state): State<AppState>,
    Json(req): Json<RestartRequest>,
) -> Result<StatusCode, AppError> {
    state.monitor.restart(req.interval()).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<MonitorError> for AppError {
    fn from(e: MonitorError) -> Self {
        match e {
            MonitorError::ZeroInterval => AppError::BadRequest {
                message: e.to_string(),
            },
            MonitorError::Closed => AppError::Unavailable {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{MonitorConfig, StopConfig};
    use crate::monitor::{Monitor, MonitorHandle};
    use crate::nextbus::{FeedSource, FetchError};

    const BODY: &str = r#"<body><predictions stopTag="3328" stopTitle="18th St &amp; Church St" routeTag="33">
        <direction title="Outbound"><prediction epochTime="1" seconds="75"/></direction>
        </predictions></body>"#;

    struct FixedSource(&'static str);

    impl FeedSource for FixedSource {
        async fn fetch(&self, _stops: &StopConfig) -> Result<String, FetchError> {
            Ok(self.0.to_string())
        }
    }

    fn monitor(body: &'static str) -> MonitorHandle {
        let config = MonitorConfig::default().with_update_interval_ms(3_600_000);
        let (handle, _task) = Monitor::spawn(FixedSource(body), &config).unwrap();
        handle
    }

    async fn wait_for_schedule(handle: &MonitorHandle) {
        let mut rx = handle.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|u| u.is_some()))
            .await
            .unwrap()
            .unwrap();
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn post_json(app: Router, uri: &str, json: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn health_ok() {
        let app = create_router(AppState::new(monitor(BODY)));
        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn loading_before_first_schedule() {
        // Every cycle fails, so nothing is ever published
        let app = create_router(AppState::new(monitor("<html/>")));

        let (status, body) = get(app.clone(), "/schedule").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"loading"}"#);

        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Loading MUNI Times..."));
    }

    #[tokio::test]
    async fn schedule_after_first_cycle() {
        let handle = monitor(BODY);
        wait_for_schedule(&handle).await;
        let app = create_router(AppState::new(handle));

        let (status, body) = get(app.clone(), "/schedule").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["stops"][0]["stop_tag"], "3328");
        assert_eq!(json["stops"][0]["routes"][0]["arrivals"][0], "1m 15s");

        let (_, html) = get(app, "/").await;
        assert!(html.contains("18th St &amp; Church St: Outbound"));
        assert!(html.contains("1m 15s"));
    }

    #[tokio::test]
    async fn control_endpoints() {
        let handle = monitor(BODY);
        wait_for_schedule(&handle).await;
        let app = create_router(AppState::new(handle.clone()));

        assert_eq!(post_json(app.clone(), "/control/stop", "").await, StatusCode::ACCEPTED);
        assert!(!handle.status().await.unwrap().running);

        assert_eq!(
            post_json(app.clone(), "/control/restart", r#"{"interval_ms": 0}"#).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            post_json(app.clone(), "/control/restart", r#"{"interval_ms": 120000}"#).await,
            StatusCode::ACCEPTED
        );
        assert_eq!(post_json(app.clone(), "/control/fetch", "").await, StatusCode::ACCEPTED);

        let (status, body) = get(app, "/control/status").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["running"], true);
        assert_eq!(json["interval_ms"], 120_000);
        assert_eq!(json["cycles"], 3);
    }
}
