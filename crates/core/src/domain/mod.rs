pub mod draft;
pub mod submission;

pub use draft::{Field, SubmissionDraft};
pub use submission::{
    SubmissionEnvelope, SubmissionOutcome, SubmissionPayload, SubmissionReceipt,
};
