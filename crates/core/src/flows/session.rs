//! One visitor's pass through the waitlist form.

use async_trait::async_trait;

use crate::domain::draft::{Field, SubmissionDraft};
use crate::domain::submission::SubmissionOutcome;
use crate::flows::engine::{FlowEngine, FlowTransitionError, WaitlistFlow};
use crate::flows::states::{ConfirmPolicy, FlowContext, FlowEvent, FlowState, TransitionOutcome};
use crate::format::{format_field, type_keystrokes};
use crate::validation::{validate, ValidationResult};

/// Sends a validated draft to the submission endpoint.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, draft: &SubmissionDraft) -> SubmissionOutcome;
}

pub struct WaitlistSession {
    engine: FlowEngine<WaitlistFlow>,
    state: FlowState,
    draft: Option<SubmissionDraft>,
    errors: ValidationResult,
    last_outcome: Option<SubmissionOutcome>,
}

impl Default for WaitlistSession {
    fn default() -> Self {
        Self::new(ConfirmPolicy::default())
    }
}

impl WaitlistSession {
    pub fn new(confirm_policy: ConfirmPolicy) -> Self {
        let engine = FlowEngine::new(WaitlistFlow::new(confirm_policy));
        let state = engine.initial_state();
        Self { engine, state, draft: None, errors: ValidationResult::default(), last_outcome: None }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// The draft while the form is shown; `None` before joining and after confirmation.
    pub fn draft(&self) -> Option<&SubmissionDraft> {
        self.draft.as_ref()
    }

    pub fn errors(&self) -> ValidationResult {
        self.errors
    }

    pub fn last_outcome(&self) -> Option<&SubmissionOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn join(&mut self) -> Result<TransitionOutcome, FlowTransitionError> {
        let outcome = self.apply(FlowEvent::JoinRequested, FlowContext::default())?;
        self.draft = Some(SubmissionDraft::default());
        Ok(outcome)
    }

    /// Applies an input change to `field` and returns the value that was stored.
    pub fn edit(&mut self, field: Field, raw: &str) -> Result<String, FlowTransitionError> {
        self.apply(FlowEvent::FieldEdited, FlowContext::default())?;
        let draft = self.draft.get_or_insert_with(SubmissionDraft::default);
        let value = format_field(field, raw, draft.get(field));
        draft.set(field, value.clone());
        Ok(value)
    }

    /// Types `keys` one at a time at the end of `field`.
    pub fn type_keys(&mut self, field: Field, keys: &str) -> Result<String, FlowTransitionError> {
        self.apply(FlowEvent::FieldEdited, FlowContext::default())?;
        let draft = self.draft.get_or_insert_with(SubmissionDraft::default);
        let value = type_keystrokes(field, draft.get(field), keys);
        draft.set(field, value.clone());
        Ok(value)
    }

    /// Validates the draft and moves to `Submitting` when it passes.
    pub fn request_submit(&mut self) -> Result<TransitionOutcome, FlowTransitionError> {
        let validation = validate(self.draft.as_ref().unwrap_or(&SubmissionDraft::default()));
        let outcome = self.apply(FlowEvent::SubmitRequested, FlowContext::validated(validation))?;
        self.errors = validation;
        Ok(outcome)
    }

    /// Records how the submission resolved.
    pub fn resolve(
        &mut self,
        submission: SubmissionOutcome,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        let event = if submission.is_success() {
            FlowEvent::SubmissionSucceeded
        } else {
            FlowEvent::SubmissionFailed
        };
        let outcome = self.apply(event, FlowContext::default())?;
        if outcome.to == FlowState::Confirmed {
            self.draft = None;
        }
        self.last_outcome = Some(submission);
        Ok(outcome)
    }

    /// Validates, submits through `submitter` when validation passes, and resolves.
    pub async fn submit<S>(&mut self, submitter: &S) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: Submitter + ?Sized,
    {
        let requested = self.request_submit()?;
        if requested.to != FlowState::Submitting {
            return Ok(requested);
        }

        let draft = self.draft.clone().unwrap_or_default();
        let submission = submitter.submit(&draft).await;
        self.resolve(submission)
    }

    fn apply(
        &mut self,
        event: FlowEvent,
        context: FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        let outcome = self.engine.apply(&self.state, &event, &context)?;
        self.state = outcome.to.clone();
        Ok(outcome)
    }
}
