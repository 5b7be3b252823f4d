//! Waitlist submission endpoint.
//!
//! - `POST /api/notion` validates the submitted form and creates one record
//!   in the external table per request.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use cove_core::{
    validate_strict, RecordFields, RecordStore, SubmissionEnvelope, SubmissionError,
    SubmissionPayload,
};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const SUBMISSION_PATH: &str = "/api/notion";

#[derive(Clone)]
pub struct SubmissionState {
    store: Arc<dyn RecordStore>,
    database_id: Option<String>,
    expose_error_details: bool,
}

impl SubmissionState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        database_id: Option<String>,
        expose_error_details: bool,
    ) -> Self {
        Self { store, database_id, expose_error_details }
    }
}

pub fn router(state: SubmissionState) -> Router {
    Router::new().route(SUBMISSION_PATH, post(submit)).with_state(state)
}

pub async fn submit(
    State(state): State<SubmissionState>,
    body: Bytes,
) -> (StatusCode, Json<SubmissionEnvelope>) {
    let correlation_id = Uuid::new_v4().to_string();

    match create_entry(&state, &body, &correlation_id).await {
        Ok(data) => {
            let record_id = data.get("id").and_then(Value::as_str).unwrap_or("unknown");
            info!(
                event_name = "submission.created",
                correlation_id = %correlation_id,
                record_id,
                "waitlist entry created"
            );
            (StatusCode::OK, Json(SubmissionEnvelope::success(data)))
        }
        Err(failure) => {
            log_failure(&failure, &correlation_id);
            let status = StatusCode::from_u16(failure.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(failure.into_envelope(state.expose_error_details)))
        }
    }
}

async fn create_entry(
    state: &SubmissionState,
    body: &[u8],
    correlation_id: &str,
) -> Result<Value, SubmissionError> {
    let payload = parse_payload(body)?;
    info!(
        event_name = "submission.received",
        correlation_id,
        missing_fields = payload.missing_fields().len(),
        "waitlist submission received"
    );

    let draft = payload.into_draft().map_err(SubmissionError::MissingFields)?;

    let database_id = state.database_id.as_deref().ok_or_else(|| {
        SubmissionError::Configuration("notion.database_id is not set".to_string())
    })?;

    let validation = validate_strict(&draft);
    if !validation.passed() {
        return Err(SubmissionError::InvalidFields(validation.failed_fields()));
    }
    let fields = RecordFields::from_draft(&draft)
        .map_err(|field| SubmissionError::InvalidFields(vec![field]))?;

    info!(event_name = "submission.store_request", correlation_id, "creating waitlist record");
    let data = state.store.create_record(database_id, &fields).await?;
    Ok(data)
}

/// Reads the body as JSON whatever the declared content type. Only a JSON
/// object is a submission.
fn parse_payload(body: &[u8]) -> Result<SubmissionPayload, SubmissionError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|error| SubmissionError::InvalidBody(error.to_string()))?;
    if !value.is_object() {
        return Err(SubmissionError::InvalidBody("request body must be a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|error| SubmissionError::InvalidBody(error.to_string()))
}

fn log_failure(failure: &SubmissionError, correlation_id: &str) {
    match failure {
        SubmissionError::InvalidBody(_)
        | SubmissionError::MissingFields(_)
        | SubmissionError::InvalidFields(_) => {
            warn!(
                event_name = "submission.rejected",
                correlation_id,
                error = %failure,
                "waitlist submission rejected"
            );
        }
        SubmissionError::Configuration(_) => {
            error!(
                event_name = "submission.configuration_error",
                correlation_id,
                error = %failure,
                "waitlist endpoint is not configured"
            );
        }
        SubmissionError::Store(store_error) => {
            error!(
                event_name = "submission.store_failed",
                correlation_id,
                error = %store_error,
                diagnostic = %store_error.diagnostic(),
                "record store rejected waitlist entry"
            );
        }
    }
}
