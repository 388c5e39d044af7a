//! User-facing notifications emitted by the orchestrator.

use tracing::{info, warn};

use crate::config::DEFAULT_MIN_CREDITS;
use crate::error::ErrorCode;
use crate::types::JobKind;

/// Informational text shown when the service reports throttling.
pub const THROTTLE_MESSAGE: &str = "Exceeding 3 requests per minute will queue your requests.";

/// A notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Advisory: requests are close to the rate limit and may be queued.
    ThrottleNotice { job_id: String, message: String },
    /// A submission or job ended in failure.
    Failure {
        /// Job the failure belongs to, None if it failed before submission.
        job_id: Option<String>,
        kind: JobKind,
        code: ErrorCode,
        message: String,
    },
}

impl Notification {
    /// Builds the throttle notice for a job.
    pub fn throttle(job_id: &str) -> Self {
        Notification::ThrottleNotice {
            job_id: job_id.to_string(),
            message: THROTTLE_MESSAGE.to_string(),
        }
    }

    /// Builds a failure notice with the code's user message.
    pub fn failure(job_id: Option<&str>, kind: JobKind, code: ErrorCode) -> Self {
        Self::failure_with_minimum(job_id, kind, code, DEFAULT_MIN_CREDITS)
    }

    /// Builds a failure notice quoting `min_credits` for balance refusals.
    pub fn failure_with_minimum(
        job_id: Option<&str>,
        kind: JobKind,
        code: ErrorCode,
        min_credits: u32,
    ) -> Self {
        Notification::Failure {
            job_id: job_id.map(str::to_string),
            kind,
            code,
            message: code.user_message_with_minimum(kind, min_credits),
        }
    }
}

/// Receives notifications for display.
pub trait Notifier: Send + Sync {
    /// Shows a notification. Called exactly once per notable event.
    fn notify(&self, notification: Notification);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::ThrottleNotice { job_id, message } => {
                info!(%job_id, "{}", message);
            }
            Notification::Failure {
                job_id,
                code,
                message,
                ..
            } => {
                warn!(job_id = job_id.as_deref().unwrap_or("-"), %code, "{}", message);
            }
        }
    }
}
