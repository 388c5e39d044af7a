//! Status poller for in-flight jobs.
//!
//! Queries job status on a fixed cadence until the job reaches a terminal
//! status, a query fails, or the cancellation token fires. Queries are
//! strictly sequential: the next tick is not awaited until the previous
//! response has been handled.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ErrorCode, OrchestratorError};
use crate::service::GenerationService;
use crate::types::JobStatus;

/// Lifecycle of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Created, not yet started.
    Idle,
    /// Issuing status queries.
    Polling,
    /// The job finished with a result URL.
    Succeeded,
    /// The job failed, or a status query failed.
    Failed,
    /// Stopped by cancellation; nothing is delivered.
    Cancelled,
}

impl PollerState {
    /// Returns true once the poller has stopped for good.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollerState::Succeeded | PollerState::Failed | PollerState::Cancelled
        )
    }
}

/// How a polling run ended.
#[derive(Debug)]
pub enum PollOutcome {
    /// The job succeeded.
    Succeeded { result_url: String },
    /// The service reported the job as failed.
    Failed,
    /// A status query failed, or the poll budget ran out.
    Errored(OrchestratorError),
    /// The owning scope cancelled the poll.
    Cancelled,
}

/// Repeating status query for a single job.
pub struct StatusPoller {
    service: Arc<dyn GenerationService>,
    job_id: String,
    interval: Duration,
    max_duration: Option<Duration>,
    cancel: CancellationToken,
    state: PollerState,
    queries: u64,
}

impl StatusPoller {
    /// Creates a poller for `job_id`, stopped by `cancel`.
    pub fn new(
        service: Arc<dyn GenerationService>,
        job_id: impl Into<String>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            service,
            job_id: job_id.into(),
            interval,
            max_duration: None,
            cancel,
            state: PollerState::Idle,
            queries: 0,
        }
    }

    /// Stops polling with [`ErrorCode::PollingFailed`] after `max_duration`.
    pub fn with_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Number of status queries issued so far.
    pub fn queries(&self) -> u64 {
        self.queries
    }

    /// Polls until a terminal outcome.
    ///
    /// The first query is issued one interval after the call. Calling `run`
    /// again after a terminal outcome returns immediately without querying.
    pub async fn run(&mut self) -> PollOutcome {
        if self.state.is_terminal() {
            return match self.state {
                PollerState::Cancelled => PollOutcome::Cancelled,
                _ => PollOutcome::Errored(OrchestratorError::new(
                    ErrorCode::PollingFailed,
                    format!("Poller for job {} already finished", self.job_id),
                )),
            };
        }

        self.state = PollerState::Polling;
        let started = Instant::now();
        let mut ticker = time::interval_at(started + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return self.cancelled(),
                _ = ticker.tick() => {}
            }

            if let Some(max) = self.max_duration {
                if started.elapsed() >= max {
                    self.state = PollerState::Failed;
                    warn!(job_id = %self.job_id, queries = self.queries, "Polling budget exhausted");
                    return PollOutcome::Errored(OrchestratorError::polling_timed_out(
                        &self.job_id,
                        started.elapsed().as_secs(),
                    ));
                }
            }

            self.queries += 1;
            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return self.cancelled(),
                response = self.service.get_job_status(&self.job_id) => response,
            };

            // A response that lands after cancellation is discarded.
            if self.cancel.is_cancelled() {
                return self.cancelled();
            }

            match response {
                Ok(report) => match report.to_status() {
                    JobStatus::Pending => {
                        debug!(job_id = %self.job_id, attempt = self.queries, "Job still pending");
                    }
                    JobStatus::Succeeded { result_url } => {
                        self.state = PollerState::Succeeded;
                        debug!(job_id = %self.job_id, attempt = self.queries, "Job succeeded");
                        return PollOutcome::Succeeded { result_url };
                    }
                    JobStatus::Failed => {
                        self.state = PollerState::Failed;
                        warn!(job_id = %self.job_id, attempt = self.queries, "Job failed");
                        return PollOutcome::Failed;
                    }
                },
                Err(e) => {
                    self.state = PollerState::Failed;
                    warn!(job_id = %self.job_id, attempt = self.queries, error = %e, "Status query failed");
                    return PollOutcome::Errored(OrchestratorError::with_source(
                        ErrorCode::PollingFailed,
                        format!("Status query for job {} failed", self.job_id),
                        e,
                    ));
                }
            }
        }
    }

    fn cancelled(&mut self) -> PollOutcome {
        self.state = PollerState::Cancelled;
        debug!(job_id = %self.job_id, queries = self.queries, "Polling cancelled");
        PollOutcome::Cancelled
    }
}
