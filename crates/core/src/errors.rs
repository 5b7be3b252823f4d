use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::draft::Field;
use crate::domain::submission::SubmissionEnvelope;
use crate::store::RecordStoreError;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";
pub const INVALID_FIELDS_MESSAGE: &str = "Invalid field values";
pub const CONFIGURATION_MESSAGE: &str = "Server configuration error";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("request body is not a JSON object: {0}")]
    InvalidBody(String),
    #[error("missing required fields: {}", field_list(.0))]
    MissingFields(Vec<Field>),
    #[error("invalid field values: {}", field_list(.0))]
    InvalidFields(Vec<Field>),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

impl SubmissionError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidBody(_) | Self::MissingFields(_) => 400,
            Self::InvalidFields(_) => 422,
            Self::Configuration(_) | Self::Store(_) => 500,
        }
    }

    /// The message a client sees; internal configuration detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidBody(_) => INVALID_BODY_MESSAGE.to_string(),
            Self::MissingFields(_) => MISSING_FIELDS_MESSAGE.to_string(),
            Self::InvalidFields(_) => INVALID_FIELDS_MESSAGE.to_string(),
            Self::Configuration(_) => CONFIGURATION_MESSAGE.to_string(),
            Self::Store(error) => error.message(),
        }
    }

    pub fn into_envelope(self, expose_details: bool) -> SubmissionEnvelope {
        let envelope = SubmissionEnvelope::failure(self.user_message());
        match self {
            Self::InvalidFields(fields) => envelope.with_details(field_names(&fields)),
            Self::Store(error) if expose_details => envelope.with_details(error.diagnostic()),
            _ => envelope,
        }
    }
}

fn field_names(fields: &[Field]) -> Value {
    json!(fields.iter().map(|field| field.wire_name()).collect::<Vec<_>>())
}

fn field_list(fields: &[Field]) -> String {
    fields.iter().map(|field| field.wire_name()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::draft::Field;
    use crate::errors::SubmissionError;
    use crate::store::RecordStoreError;

    #[test]
    fn missing_fields_map_to_bad_request() {
        let error = SubmissionError::MissingFields(vec![Field::City]);
        assert_eq!(error.status_code(), 400);
        assert_eq!(error.to_string(), "missing required fields: city");

        let envelope = error.into_envelope(true);
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Missing required fields"));
        assert_eq!(envelope.details, None);
    }

    #[test]
    fn invalid_fields_list_the_offenders() {
        let error = SubmissionError::InvalidFields(vec![Field::PhoneNumber, Field::Age]);
        assert_eq!(error.status_code(), 422);
        assert_eq!(error.into_envelope(false).details, Some(json!(["phoneNumber", "age"])));
    }

    #[test]
    fn configuration_error_hides_detail_from_clients() {
        let error = SubmissionError::Configuration("notion.database_id is not set".to_string());
        assert_eq!(error.status_code(), 500);
        assert_eq!(error.user_message(), "Server configuration error");
    }

    #[test]
    fn store_error_details_follow_exposure_setting() {
        let error = SubmissionError::from(RecordStoreError::Transport {
            message: "connection reset".to_string(),
        });
        assert_eq!(error.status_code(), 500);

        let exposed = error.clone().into_envelope(true);
        assert_eq!(exposed.error.as_deref(), Some("request to record store failed: connection reset"));
        assert_eq!(exposed.details.as_ref().map(|details| &details["kind"]), Some(&json!("transport")));

        assert_eq!(error.into_envelope(false).details, None);
    }
}
