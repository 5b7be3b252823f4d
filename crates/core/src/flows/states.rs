use serde::{Deserialize, Serialize};

use crate::validation::ValidationResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    /// Join button visible, form hidden.
    Idle,
    Editing,
    /// Validation passed and the submission is in flight.
    Submitting,
    Confirmed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    JoinRequested,
    FieldEdited,
    SubmitRequested,
    SubmissionSucceeded,
    SubmissionFailed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    /// Result of validating the draft; required when submitting.
    pub validation: Option<ValidationResult>,
}

impl FlowContext {
    pub fn validated(validation: ValidationResult) -> Self {
        Self { validation: Some(validation) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    ShowForm,
    ApplyFormatter,
    MarkFieldErrors,
    ClearFieldErrors,
    SendSubmission,
    ShowConfirmation,
    ReportFailure,
    DiscardDraft,
}

/// What happens when the submission resolves with a failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmPolicy {
    /// Confirm regardless of the outcome.
    #[default]
    Always,
    /// Only confirm on success; a failure returns to editing.
    OnSuccess,
}

impl ConfirmPolicy {
    pub fn from_confirm_on_failure(confirm_on_failure: bool) -> Self {
        if confirm_on_failure {
            Self::Always
        } else {
            Self::OnSuccess
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: FlowState,
    pub to: FlowState,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}
