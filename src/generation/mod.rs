//! Generation job orchestration.
//!
//! Provides the pipeline from a validated submission to a published result:
//! precondition checks, payload upload, job submission, status polling and
//! result handoff, driven by [`GenerationOrchestrator`].

pub mod handoff;
pub mod notify;
pub mod orchestrator;
pub mod poller;
pub mod submitter;
pub mod upload;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use handoff::{build_result, RequestMeta, ResultHandoff, SOUND_EFFECT_SERVICE};
pub use notify::{LogNotifier, Notification, Notifier, THROTTLE_MESSAGE};
pub use orchestrator::{GenerationOrchestrator, JobHandle, JobOutcome, OrchestratorState};
pub use poller::{PollOutcome, PollerState, StatusPoller};
pub use submitter::submit;
pub use upload::upload;
pub use validator::{PreconditionValidator, MAX_UPLOAD_BYTES};
