//! Job types for tracking remote generation requests.
//!
//! A Job is created by a successful submission and tracked by the status
//! poller until it reaches a terminal status or is cancelled.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// What a job produces, used for notification wording and result tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Sound effect generated from a text description.
    SoundEffect,
    /// Speech-to-speech conversion of an uploaded audio file.
    VoiceConversion,
}

impl JobKind {
    /// Verb phrase used in user-facing messages.
    pub fn action(&self) -> &'static str {
        match self {
            JobKind::SoundEffect => "generate sound effects",
            JobKind::VoiceConversion => "convert voice",
        }
    }

    /// Verb phrase used when a job of this kind fails.
    pub fn failure_action(&self) -> &'static str {
        match self {
            JobKind::SoundEffect => "generate sound effect",
            JobKind::VoiceConversion => "convert voice",
        }
    }
}

/// Status of a remote job as observed by a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    /// Still queued or generating on the service side.
    Pending,
    /// Finished; the audio is available at `result_url`.
    Succeeded { result_url: String },
    /// Finished without producing audio.
    Failed,
}

impl JobStatus {
    /// Returns true if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// A remote generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Opaque identifier assigned by the generation service.
    pub id: String,

    /// When the submission was accepted.
    #[serde(with = "system_time_serde")]
    pub submitted_at: SystemTime,
}

impl Job {
    /// Creates a job for an identifier just returned by the service.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            submitted_at: SystemTime::now(),
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct JobTicket {
    /// The created job.
    pub job: Job,
    /// Whether the service asked to show its throttle notice.
    pub should_show_throttle_alert: bool,
}

/// Custom serde implementation for SystemTime as Unix seconds.
pub(crate) mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}
