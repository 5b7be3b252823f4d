pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod format;
pub mod store;
pub mod validation;

pub use domain::draft::{Field, SubmissionDraft};
pub use domain::submission::{
    SubmissionEnvelope, SubmissionOutcome, SubmissionPayload, SubmissionReceipt,
};
pub use errors::SubmissionError;
pub use flows::{ConfirmPolicy, FlowState, Submitter, WaitlistSession};
pub use store::{InMemoryRecordStore, RecordFields, RecordStore, RecordStoreError};
pub use validation::{validate, validate_strict, ValidationResult};
