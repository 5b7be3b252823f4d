pub mod engine;
pub mod session;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, WaitlistFlow};
pub use session::{Submitter, WaitlistSession};
pub use states::{
    ConfirmPolicy, FlowAction, FlowContext, FlowEvent, FlowState, TransitionOutcome,
};
