//! Remote generation service interface.
//!
//! The orchestrator only depends on the traits in this module:
//! - [`GenerationService`]: submit jobs, request upload targets, query status
//! - [`PayloadUploader`]: write a payload to a pre-signed upload target
//!
//! [`HttpGenerationService`] implements both over HTTP.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::JobStatus;

pub use http::HttpGenerationService;

/// Transport-level errors returned by service implementations.
///
/// Variants are decided where the HTTP response is interpreted, so the
/// orchestrator can classify failures without inspecting messages.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service refused because the account lacks credits.
    #[error("Insufficient credits: {0}")]
    InsufficientCredits(String),

    /// The service answered with a non-success status.
    #[error("Service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be interpreted.
    #[error("Malformed service response: {0}")]
    Decode(String),

    /// The request never completed.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local I/O failed while handling a response.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Response to a job submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    /// Identifier to poll.
    #[serde(rename = "audioId")]
    pub job_id: String,

    /// Request volume is close to the rate limit; purely advisory.
    #[serde(rename = "shouldShowThrottleAlert", default)]
    pub throttled: bool,
}

/// A single-use pre-signed location for an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    /// URL accepting a direct PUT of the payload.
    #[serde(rename = "uploadUrl")]
    pub write_url: String,

    /// Key referencing the stored payload in a later submission.
    #[serde(rename = "s3Key")]
    pub storage_key: String,
}

/// Raw status record returned by a status query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// `Some(true)` once finished, `Some(false)` when the job failed.
    #[serde(default)]
    pub success: Option<bool>,

    /// Location of the finished audio.
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl StatusReport {
    /// Interprets the raw record.
    ///
    /// `success: true` counts as finished only once an audio URL is present;
    /// `success: false` is the explicit failure flag; anything else is pending.
    pub fn to_status(&self) -> JobStatus {
        match (self.success, self.audio_url.as_deref()) {
            (Some(true), Some(url)) if !url.is_empty() => JobStatus::Succeeded {
                result_url: url.to_string(),
            },
            (Some(false), _) => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }
}

/// Operations the remote generation service must expose.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submits a sound effect job for a text description.
    async fn submit_text_job(&self, content: &str) -> Result<JobCreated, ServiceError>;

    /// Submits a voice conversion job for an uploaded payload.
    async fn submit_file_job(
        &self,
        storage_key: &str,
        voice_id: &str,
    ) -> Result<JobCreated, ServiceError>;

    /// Requests a fresh upload target for a payload of the given type.
    async fn request_upload_target(&self, content_type: &str)
        -> Result<UploadTarget, ServiceError>;

    /// Queries the status of a job.
    async fn get_job_status(&self, job_id: &str) -> Result<StatusReport, ServiceError>;
}

/// Writes payloads to upload targets.
#[async_trait]
pub trait PayloadUploader: Send + Sync {
    /// Transfers `bytes` to `target` in a single direct write.
    async fn put(
        &self,
        target: &UploadTarget,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ServiceError>;
}
