use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    database_configured: bool,
}

impl HealthState {
    pub fn new(database_id: Option<&str>) -> Self {
        Self { database_configured: database_id.is_some_and(|id| !id.trim().is_empty()) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub record_store: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let record_store = if state.database_configured {
        HealthCheck { status: "ready", detail: "notion database configured".to_string() }
    } else {
        HealthCheck {
            status: "unconfigured",
            detail: "notion.database_id is not set; submissions will fail".to_string(),
        }
    };
    let ready = state.database_configured;

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "cove-server runtime initialized".to_string(),
        },
        record_store,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}
