//! Generation orchestrator.
//!
//! Ties the pipeline together for one surface: validate, upload (file jobs),
//! submit, then poll in a background task that hands the result off. At most
//! one job is in flight per orchestrator; dropping the orchestrator cancels
//! any poll it started.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::OrchestratorConfig;
use crate::error::{ErrorCode, OrchestratorError, Result};
use crate::registry::{PlaybackRegistry, VoiceResolver};
use crate::service::{GenerationService, PayloadUploader};
use crate::types::{AudioFile, GenerationRequest, Job, JobKind, Submission, TextPrompt};

use super::handoff::{RequestMeta, ResultHandoff};
use super::notify::{Notification, Notifier};
use super::poller::{PollOutcome, StatusPoller};
use super::submitter::submit;
use super::upload::upload;
use super::validator::PreconditionValidator;

/// Observable state of an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrchestratorState {
    /// Nothing in flight.
    Idle,
    /// Validated; uploading and/or submitting.
    Submitting,
    /// Job accepted, status being polled.
    Polling { job_id: String },
    /// Last job published a result.
    Done { result_id: String },
    /// Last attempt failed.
    Error { code: ErrorCode },
}

/// How a polled job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The result was published under this id.
    Published(String),
    /// The job failed; the code is the diagnostic cause.
    Failed(ErrorCode),
    /// Polling was cancelled; nothing was published or reported.
    Cancelled,
}

/// A submitted job and the task polling it.
#[derive(Debug)]
pub struct JobHandle {
    pub job: Job,
    pub kind: JobKind,
    pub throttled: bool,
    task: JoinHandle<JobOutcome>,
}

impl JobHandle {
    /// Waits for the poll task to finish.
    pub async fn wait(self) -> std::result::Result<JobOutcome, JoinError> {
        self.task.await
    }
}

/// The job currently holding the surface.
struct ActiveJob {
    serial: u64,
    token: CancellationToken,
}

fn lock_active(active: &Mutex<Option<ActiveJob>>) -> MutexGuard<'_, Option<ActiveJob>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One job's claim on the surface.
///
/// The claim ends when it is dropped or when the job is cancelled, whichever
/// comes first. Once it has ended, the job can no longer change state, publish
/// or notify, so a late task never touches the job that replaced it.
struct JobSlot {
    active: Arc<Mutex<Option<ActiveJob>>>,
    state: Arc<watch::Sender<OrchestratorState>>,
    serial: u64,
}

impl JobSlot {
    /// Runs `f` while this job still holds the surface.
    fn while_held<R>(&self, f: impl FnOnce(&watch::Sender<OrchestratorState>) -> R) -> Option<R> {
        let active = lock_active(&self.active);
        match active.as_ref() {
            Some(job) if job.serial == self.serial => Some(f(&self.state)),
            _ => None,
        }
    }

    fn set_state(&self, state: OrchestratorState) -> bool {
        self.while_held(|tx| {
            tx.send_replace(state);
        })
        .is_some()
    }
}

impl Drop for JobSlot {
    fn drop(&mut self) {
        let mut active = lock_active(&self.active);
        if active.as_ref().is_some_and(|job| job.serial == self.serial) {
            *active = None;
            // Abandoned mid-submission: no job exists to report on.
            self.state.send_if_modified(|state| {
                if *state == OrchestratorState::Submitting {
                    *state = OrchestratorState::Idle;
                    true
                } else {
                    false
                }
            });
        }
    }
}

/// Runs generation jobs for one surface.
pub struct GenerationOrchestrator {
    service: Arc<dyn GenerationService>,
    uploader: Arc<dyn PayloadUploader>,
    registry: Arc<dyn PlaybackRegistry>,
    notifier: Arc<dyn Notifier>,
    voices: Arc<dyn VoiceResolver>,
    validator: PreconditionValidator,
    poll_interval: Duration,
    max_poll_duration: Option<Duration>,
    voice_service: String,
    state: Arc<watch::Sender<OrchestratorState>>,
    scope: CancellationToken,
    active: Arc<Mutex<Option<ActiveJob>>>,
    next_serial: AtomicU64,
}

impl GenerationOrchestrator {
    /// Creates an orchestrator using the polling and validation settings in `config`.
    pub fn new(
        service: Arc<dyn GenerationService>,
        uploader: Arc<dyn PayloadUploader>,
        registry: Arc<dyn PlaybackRegistry>,
        notifier: Arc<dyn Notifier>,
        voices: Arc<dyn VoiceResolver>,
        config: &OrchestratorConfig,
    ) -> Self {
        let (state, _) = watch::channel(OrchestratorState::Idle);
        Self {
            service,
            uploader,
            registry,
            notifier,
            voices,
            validator: PreconditionValidator::new(config.min_credits),
            poll_interval: config.poll_interval,
            max_poll_duration: config.max_poll_duration,
            voice_service: config.voice_service.clone(),
            state: Arc::new(state),
            scope: CancellationToken::new(),
            active: Arc::new(Mutex::new(None)),
            next_serial: AtomicU64::new(1),
        }
    }

    /// Current state.
    pub fn state(&self) -> OrchestratorState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    /// Returns true while a submission or poll is in progress.
    pub fn is_in_flight(&self) -> bool {
        lock_active(&self.active).is_some()
    }

    /// Submits a sound effect prompt. Input longer than the prompt limit is truncated.
    pub async fn submit_text(&self, text: &str, balance: u32) -> Result<JobHandle> {
        self.submit(Submission::Text(TextPrompt::capture(text)), balance)
            .await
    }

    /// Submits a voice conversion using the voice selected for `profile_key`.
    pub async fn submit_file(
        &self,
        file: AudioFile,
        profile_key: &str,
        balance: u32,
    ) -> Result<JobHandle> {
        let submission = Submission::File {
            file,
            profile_key: profile_key.to_string(),
        };
        self.submit(submission, balance).await
    }

    /// Validates, uploads if needed, submits, and starts polling.
    ///
    /// Returns once the job is accepted; the returned handle resolves when
    /// polling ends. Every failure before that point is reported through
    /// the notifier exactly once, except `JobInFlight`, which leaves the
    /// running job untouched. Dropping the future before it resolves frees
    /// the surface and returns the state to `Idle`.
    pub async fn submit(&self, submission: Submission, balance: u32) -> Result<JobHandle> {
        let (slot, token) = match self.claim() {
            Some(claim) => claim,
            None => {
                debug!("Rejecting overlapping submission");
                return Err(OrchestratorError::job_in_flight());
            }
        };
        let kind = submission.kind();

        if let Err(e) = self.validator.validate(&submission, balance) {
            return Err(self.fail(slot, kind, e));
        }

        slot.set_state(OrchestratorState::Submitting);

        let (request, meta) = match self.prepare(submission).await {
            Ok(prepared) => prepared,
            Err(e) => return Err(self.fail(slot, kind, e)),
        };

        let ticket = match submit(self.service.as_ref(), &request).await {
            Ok(ticket) => ticket,
            Err(e) => return Err(self.fail(slot, kind, e)),
        };
        let job = ticket.job;

        let polling = slot.while_held(|state| {
            if ticket.should_show_throttle_alert {
                self.notifier.notify(Notification::throttle(&job.id));
            }
            state.send_replace(OrchestratorState::Polling {
                job_id: job.id.clone(),
            });
        });
        match polling {
            Some(()) => info!(job_id = %job.id, ?kind, "Polling job"),
            None => debug!(job_id = %job.id, "Job cancelled during submission"),
        }

        let poller = StatusPoller::new(
            self.service.clone(),
            job.id.clone(),
            self.poll_interval,
            token,
        )
        .with_max_duration(self.max_poll_duration);
        let handoff = ResultHandoff::new(self.registry.clone(), self.notifier.clone());
        let task = tokio::spawn(run_job(poller, handoff, job.clone(), meta, slot));

        Ok(JobHandle {
            job,
            kind,
            throttled: ticket.should_show_throttle_alert,
            task,
        })
    }

    /// Cancels the job in flight, if any. Nothing is published or reported for it.
    ///
    /// The surface is free again as soon as this returns. Returns true if a
    /// job was cancelled.
    pub fn cancel(&self) -> bool {
        let mut active = lock_active(&self.active);
        match active.take() {
            Some(job) => {
                debug!(serial = job.serial, "Cancelling active job");
                job.token.cancel();
                self.state.send_replace(OrchestratorState::Idle);
                true
            }
            None => false,
        }
    }

    /// Takes the surface for a new job, or None if one is in flight.
    fn claim(&self) -> Option<(JobSlot, CancellationToken)> {
        let mut active = lock_active(&self.active);
        if active.is_some() {
            return None;
        }
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let token = self.scope.child_token();
        *active = Some(ActiveJob {
            serial,
            token: token.clone(),
        });
        let slot = JobSlot {
            active: self.active.clone(),
            state: self.state.clone(),
            serial,
        };
        Some((slot, token))
    }

    /// Builds the service request, uploading the payload for file jobs.
    async fn prepare(&self, submission: Submission) -> Result<(GenerationRequest, RequestMeta)> {
        match submission {
            Submission::Text(prompt) => {
                let meta = RequestMeta::for_text(&prompt);
                let request = GenerationRequest::Text {
                    content: prompt.into(),
                };
                Ok((request, meta))
            }
            Submission::File { file, profile_key } => {
                let voice_id = self
                    .voices
                    .resolve_voice(&profile_key)
                    .ok_or_else(|| OrchestratorError::voice_unavailable(&profile_key))?;
                let meta =
                    RequestMeta::for_file(file.name.as_deref(), &voice_id, &self.voice_service);
                let storage_key =
                    upload(self.service.as_ref(), self.uploader.as_ref(), file).await?;
                Ok((
                    GenerationRequest::FileReference {
                        storage_key,
                        voice_id,
                    },
                    meta,
                ))
            }
        }
    }

    /// Records a failure before a job exists and notifies once, unless the
    /// attempt was cancelled first.
    fn fail(&self, slot: JobSlot, kind: JobKind, error: OrchestratorError) -> OrchestratorError {
        let min_credits = self.validator.min_balance();
        let reported = slot.while_held(|state| {
            state.send_replace(OrchestratorState::Error { code: error.code });
            self.notifier.notify(Notification::failure_with_minimum(
                None,
                kind,
                error.code,
                min_credits,
            ));
        });
        match reported {
            Some(()) => warn!(error = %error, ?kind, "Submission attempt failed"),
            None => debug!(error = %error, "Cancelled submission failed"),
        }
        error
    }
}

impl Drop for GenerationOrchestrator {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

/// Polls one job to completion and settles it.
///
/// A job whose claim was released by `cancel` ends as `Cancelled` without
/// touching the registry, the notifier or the state.
async fn run_job(
    mut poller: StatusPoller,
    handoff: ResultHandoff,
    job: Job,
    meta: RequestMeta,
    slot: JobSlot,
) -> JobOutcome {
    let outcome = poller.run().await;
    let settled = slot.while_held(|state| match outcome {
        PollOutcome::Succeeded { result_url } => {
            handoff.on_success(&job, &result_url, &meta);
            state.send_replace(OrchestratorState::Done {
                result_id: job.id.clone(),
            });
            JobOutcome::Published(job.id.clone())
        }
        PollOutcome::Failed => {
            handoff.on_failure(&job, meta.kind, ErrorCode::GenericFailure);
            state.send_replace(OrchestratorState::Error {
                code: ErrorCode::GenericFailure,
            });
            JobOutcome::Failed(ErrorCode::GenericFailure)
        }
        PollOutcome::Errored(e) => {
            warn!(job_id = %job.id, error = %e, "Polling stopped on error");
            handoff.on_failure(&job, meta.kind, ErrorCode::GenericFailure);
            state.send_replace(OrchestratorState::Error { code: e.code });
            JobOutcome::Failed(e.code)
        }
        PollOutcome::Cancelled => {
            state.send_replace(OrchestratorState::Idle);
            JobOutcome::Cancelled
        }
    });
    let outcome = settled.unwrap_or(JobOutcome::Cancelled);
    if outcome == JobOutcome::Cancelled {
        info!(job_id = %job.id, "Job cancelled");
    }
    outcome
}
