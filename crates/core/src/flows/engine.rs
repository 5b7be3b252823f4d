use thiserror::Error;

use crate::flows::states::{
    ConfirmPolicy, FlowAction, FlowContext, FlowEvent, FlowState, TransitionOutcome,
};

pub trait FlowDefinition {
    fn initial_state(&self) -> FlowState;
    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

#[derive(Clone, Debug, Default)]
pub struct WaitlistFlow {
    pub confirm_policy: ConfirmPolicy,
}

impl WaitlistFlow {
    pub fn new(confirm_policy: ConfirmPolicy) -> Self {
        Self { confirm_policy }
    }
}

impl FlowDefinition for WaitlistFlow {
    fn initial_state(&self) -> FlowState {
        FlowState::Idle
    }

    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_waitlist(self.confirm_policy, current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> FlowState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }
}

impl Default for FlowEngine<WaitlistFlow> {
    fn default() -> Self {
        Self::new(WaitlistFlow::default())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("submit from {state:?} requires a validation result")]
    ValidationRequired { state: FlowState },
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FlowState, event: FlowEvent },
}

fn transition_waitlist(
    policy: ConfirmPolicy,
    current: &FlowState,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowAction::{
        ApplyFormatter, ClearFieldErrors, DiscardDraft, MarkFieldErrors, ReportFailure,
        SendSubmission, ShowConfirmation, ShowForm,
    };
    use FlowEvent::{
        FieldEdited, JoinRequested, SubmissionFailed, SubmissionSucceeded, SubmitRequested,
    };
    use FlowState::{Confirmed, Editing, Idle, Submitting};

    let (to, actions) = match (current, event) {
        (Idle, JoinRequested) => (Editing, vec![ShowForm]),
        (Editing, FieldEdited) => (Editing, vec![ApplyFormatter]),
        (Editing, SubmitRequested) => {
            let Some(validation) = &context.validation else {
                return Err(FlowTransitionError::ValidationRequired { state: current.clone() });
            };
            if validation.passed() {
                (Submitting, vec![ClearFieldErrors, SendSubmission])
            } else {
                (Editing, vec![MarkFieldErrors])
            }
        }
        (Submitting, SubmissionSucceeded) => (Confirmed, vec![ShowConfirmation, DiscardDraft]),
        (Submitting, SubmissionFailed) => match policy {
            ConfirmPolicy::Always => (Confirmed, vec![ShowConfirmation, DiscardDraft]),
            ConfirmPolicy::OnSuccess => (Editing, vec![ReportFailure]),
        },
        _ => {
            return Err(FlowTransitionError::InvalidTransition {
                state: current.clone(),
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: current.clone(), to, event: event.clone(), actions })
}
