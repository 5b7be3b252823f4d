//! Port to the external table that stores waitlist entries.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::draft::{Field, SubmissionDraft};

/// A waitlist entry mapped onto the columns of the external table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordFields {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub age: u16,
}

impl RecordFields {
    /// Maps a validated draft. Fails with the offending field when the age is not numeric.
    pub fn from_draft(draft: &SubmissionDraft) -> Result<Self, Field> {
        let age = draft.age.trim().parse::<u16>().map_err(|_| Field::Age)?;
        Ok(Self {
            name: draft.full_name.trim().to_string(),
            phone: draft.phone_number.trim().to_string(),
            city: draft.city.trim().to_string(),
            age,
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecordStoreError {
    #[error("request to record store failed: {message}")]
    Transport { message: String },
    #[error("{message}")]
    Api { status: u16, code: String, message: String },
    #[error("could not decode record store response: {message}")]
    Decode { message: String },
}

impl RecordStoreError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Structured description of the failure for logs and error responses.
    pub fn diagnostic(&self) -> Value {
        match self {
            Self::Transport { message } => json!({ "kind": "transport", "message": message }),
            Self::Api { status, code, message } => {
                json!({ "kind": "api", "status": status, "code": code, "message": message })
            }
            Self::Decode { message } => json!({ "kind": "decode", "message": message }),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Appends one record to `table_id` and returns the store's response payload.
    async fn create_record(
        &self,
        table_id: &str,
        fields: &RecordFields,
    ) -> Result<Value, RecordStoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRecord {
    pub table_id: String,
    pub fields: RecordFields,
}

/// Keeps created records in memory; can be told to fail every call.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<Vec<StoredRecord>>>,
    failure: Option<RecordStoreError>,
}

impl InMemoryRecordStore {
    pub fn failing(error: RecordStoreError) -> Self {
        Self { records: Arc::default(), failure: Some(error) }
    }

    pub fn records(&self) -> Vec<StoredRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_record(
        &self,
        table_id: &str,
        fields: &RecordFields,
    ) -> Result<Value, RecordStoreError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let record = StoredRecord { table_id: table_id.to_string(), fields: fields.clone() };
        let index = match self.records.lock() {
            Ok(mut records) => {
                records.push(record);
                records.len()
            }
            Err(poisoned) => {
                let mut records = poisoned.into_inner();
                records.push(record);
                records.len()
            }
        };

        Ok(json!({ "object": "page", "id": format!("in-memory-{index}") }))
    }
}
