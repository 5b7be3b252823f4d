use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::draft::{Field, SubmissionDraft};

/// Request body accepted by the submission endpoint.
///
/// Fields are kept as raw JSON so that presence can be judged the way a
/// loosely typed client would: `null`, `false`, `0` and `""` all count as
/// missing.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(default)]
    pub full_name: Option<Value>,
    #[serde(default)]
    pub phone_number: Option<Value>,
    #[serde(default)]
    pub city: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
}

impl SubmissionPayload {
    fn raw(&self, field: Field) -> Option<&Value> {
        match field {
            Field::FullName => self.full_name.as_ref(),
            Field::PhoneNumber => self.phone_number.as_ref(),
            Field::City => self.city.as_ref(),
            Field::Age => self.age.as_ref(),
        }
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|field| present_text(self.raw(*field)).is_none()).collect()
    }

    /// Converts the payload into a draft, or reports every field that is absent.
    pub fn into_draft(self) -> Result<SubmissionDraft, Vec<Field>> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(missing);
        }

        let mut draft = SubmissionDraft::default();
        for field in Field::ALL {
            if let Some(text) = present_text(self.raw(field)) {
                draft.set(field, text);
            }
        }
        Ok(draft)
    }
}

fn present_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

/// JSON response returned by the submission endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl SubmissionEnvelope {
    pub fn success(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None, details: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()), details: None }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionReceipt {
    /// Identifier of the record created by the external store, when it reported one.
    pub record_id: Option<String>,
    pub data: Value,
}

impl SubmissionReceipt {
    pub fn from_data(data: Value) -> Self {
        let record_id = data.get("id").and_then(Value::as_str).map(str::to_string);
        Self { record_id, data }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionOutcome {
    Success(SubmissionReceipt),
    Failure(String),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{SubmissionEnvelope, SubmissionPayload, SubmissionReceipt};
    use crate::domain::draft::Field;

    fn payload(value: serde_json::Value) -> SubmissionPayload {
        serde_json::from_value(value).expect("payload deserializes")
    }

    #[test]
    fn complete_payload_converts_into_draft() {
        let draft = payload(json!({
            "fullName": "Jane Doe",
            "phoneNumber": "555-123-4567",
            "city": "Austin",
            "age": "29"
        }))
        .into_draft()
        .expect("all fields present");

        assert_eq!(draft.full_name, "Jane Doe");
        assert_eq!(draft.phone_number, "555-123-4567");
        assert_eq!(draft.city, "Austin");
        assert_eq!(draft.age, "29");
    }

    #[test]
    fn falsy_values_count_as_missing() {
        let missing = payload(json!({
            "fullName": "",
            "phoneNumber": null,
            "city": false,
            "age": 0
        }))
        .missing_fields();

        assert_eq!(missing, Field::ALL.to_vec());
    }

    #[test]
    fn numeric_age_is_accepted_as_text() {
        let draft = payload(json!({
            "fullName": "Jane Doe",
            "phoneNumber": "555-123-4567",
            "city": "Austin",
            "age": 29
        }))
        .into_draft()
        .expect("numeric age is truthy");

        assert_eq!(draft.age, "29");
    }

    #[test]
    fn legacy_schema_reports_the_current_fields_as_missing() {
        let missing = payload(json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "phoneNumber": "555-123-4567",
            "city": "Austin"
        }))
        .into_draft()
        .expect_err("legacy schema lacks fullName and age");

        assert_eq!(missing, vec![Field::FullName, Field::Age]);
    }

    #[test]
    fn envelope_omits_absent_members() {
        let encoded = serde_json::to_value(SubmissionEnvelope::failure("Missing required fields"))
            .expect("envelope serializes");

        assert_eq!(encoded, json!({"success": false, "error": "Missing required fields"}));
    }

    #[test]
    fn receipt_picks_up_record_id() {
        let receipt = SubmissionReceipt::from_data(json!({"object": "page", "id": "page-1"}));
        assert_eq!(receipt.record_id.as_deref(), Some("page-1"));
    }
}
