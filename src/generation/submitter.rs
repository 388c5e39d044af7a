//! Job submission and classification of submission failures.

use tracing::{info, warn};

use crate::error::{ErrorCode, OrchestratorError, Result};
use crate::service::{GenerationService, ServiceError};
use crate::types::{GenerationRequest, Job, JobTicket};

/// Submits a generation request and returns the created job.
///
/// Has no side effect beyond the network call.
pub async fn submit(
    service: &dyn GenerationService,
    request: &GenerationRequest,
) -> Result<JobTicket> {
    let created = match request {
        GenerationRequest::Text { content } => service.submit_text_job(content).await,
        GenerationRequest::FileReference {
            storage_key,
            voice_id,
        } => service.submit_file_job(storage_key, voice_id).await,
    }
    .map_err(classify)?;

    info!(job_id = %created.job_id, throttled = created.throttled, "Job submitted");

    Ok(JobTicket {
        job: Job::new(created.job_id),
        should_show_throttle_alert: created.throttled,
    })
}

/// Maps a transport error to the orchestrator taxonomy.
fn classify(error: ServiceError) -> OrchestratorError {
    warn!(error = %error, "Submission failed");
    match error {
        ServiceError::InsufficientCredits(message) => OrchestratorError::new(
            ErrorCode::InsufficientBalance,
            format!("Service refused the job: {}", message),
        ),
        other => OrchestratorError::with_source(
            ErrorCode::SubmissionFailed,
            "Generation service rejected the request",
            other,
        ),
    }
}
