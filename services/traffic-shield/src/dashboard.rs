//! JSON API for the display layer

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::engine::Engine;
use crate::error::TrafficShieldError;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub engine: Arc<Engine>,
}

#[derive(Debug, Deserialize)]
struct SelectDeviceRequest {
    device_id: String,
}

#[derive(Debug, Deserialize)]
struct PrivacyRequest {
    enabled: bool,
}

/// Build the dashboard axum router
pub fn build_router(engine: Arc<Engine>) -> Router {
    let dashboard_state = DashboardState { engine };

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/devices", get(devices_handler))
        .route("/api/selected-device", put(select_device_handler))
        .route("/api/readings", get(readings_handler))
        .route("/api/ledger", get(ledger_handler))
        .route("/api/alerts", get(alerts_handler))
        .route("/api/alerts/{id}/resolve", post(resolve_alert_handler))
        .route("/api/privacy", put(privacy_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(dashboard_state)
}

impl IntoResponse for TrafficShieldError {
    fn into_response(self) -> Response {
        let status = match self {
            TrafficShieldError::UnknownDevice(_) => StatusCode::NOT_FOUND,
            TrafficShieldError::Config(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

async fn status_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.engine.state().read().await;

    Json(serde_json::json!({
        "connected": state.connected,
        "selected_device": state.selected_device,
        "privacy_mode": state.privacy_mode,
        "ticks": state.ticks,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "summary": state.summary(),
    }))
}

async fn devices_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.engine.state().read().await;
    Json(state.devices.all().to_vec())
}

async fn select_device_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<SelectDeviceRequest>,
) -> Result<StatusCode, TrafficShieldError> {
    tracing::debug!("Select device request: {:?}", request.device_id);
    dashboard.engine.select_device(&request.device_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn readings_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.engine.state().read().await;
    Json(state.readings_view())
}

async fn ledger_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.engine.state().read().await;
    Json(state.simulator.ledger.to_vec())
}

async fn alerts_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.engine.state().read().await;
    Json(state.simulator.alerts.to_vec())
}

async fn resolve_alert_handler(
    State(dashboard): State<DashboardState>,
    Path(id): Path<u64>,
) -> StatusCode {
    let resolved = dashboard.engine.state().write().await.resolve_alert(id);
    if resolved {
        tracing::info!("Alert {} resolved", id);
    } else {
        tracing::debug!("Resolve for unknown alert {} ignored", id);
    }
    StatusCode::NO_CONTENT
}

async fn privacy_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<PrivacyRequest>,
) -> StatusCode {
    dashboard.engine.state().write().await.privacy_mode = request.enabled;
    tracing::info!(
        "Privacy mode {}",
        if request.enabled { "on" } else { "off" }
    );
    StatusCode::NO_CONTENT
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
