use async_trait::async_trait;
use cove_core::{
    SubmissionDraft, SubmissionEnvelope, SubmissionOutcome, SubmissionReceipt, Submitter,
};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

pub const GENERIC_FAILURE: &str = "Failed to submit form";

/// Posts drafts to the waitlist submission endpoint.
#[derive(Clone, Debug)]
pub struct SubmissionClient {
    client: Client,
    endpoint_url: String,
}

impl SubmissionClient {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint_url: endpoint_url.into() }
    }
}

#[async_trait]
impl Submitter for SubmissionClient {
    async fn submit(&self, draft: &SubmissionDraft) -> SubmissionOutcome {
        let response = match self.client.post(&self.endpoint_url).json(draft).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    event_name = "client.submission.transport_error",
                    endpoint = %self.endpoint_url,
                    error = %error,
                    "submission request failed"
                );
                return SubmissionOutcome::Failure(error.to_string());
            }
        };

        let status = response.status();
        let envelope = response.json::<SubmissionEnvelope>().await.ok();

        if !status.is_success() {
            let message = envelope
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            warn!(
                event_name = "client.submission.rejected",
                status = status.as_u16(),
                error = %message,
                "submission endpoint returned an error"
            );
            return SubmissionOutcome::Failure(message);
        }

        match envelope {
            Some(SubmissionEnvelope { success: false, error, .. }) => {
                SubmissionOutcome::Failure(error.unwrap_or_else(|| GENERIC_FAILURE.to_string()))
            }
            Some(SubmissionEnvelope { data, .. }) => {
                let receipt = SubmissionReceipt::from_data(data.unwrap_or(Value::Null));
                info!(
                    event_name = "client.submission.accepted",
                    record_id = receipt.record_id.as_deref().unwrap_or("unknown"),
                    "submission accepted"
                );
                SubmissionOutcome::Success(receipt)
            }
            None => SubmissionOutcome::Success(SubmissionReceipt::from_data(Value::Null)),
        }
    }
}
