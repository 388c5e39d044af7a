//! Error types for the generation orchestrator.
//!
//! Every failure the orchestrator can surface maps to exactly one
//! [`ErrorCode`]. The code decides the single user-facing notification
//! text, so callers never pattern-match on messages.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::DEFAULT_MIN_CREDITS;
use crate::types::JobKind;

/// Error codes surfaced by the orchestrator.
///
/// These codes appear in JSON-RPC error payloads and in failure
/// notifications, allowing clients to react to specific conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Not enough credits to start a generation.
    /// Trigger: local balance below the minimum, or the service refused for lack of credits.
    InsufficientBalance,

    /// Text prompt is blank after trimming.
    EmptyInput,

    /// Audio file type is not one of the accepted formats.
    /// Trigger: declared type outside audio/mp3, audio/wav.
    UnsupportedMediaType,

    /// Audio file exceeds the upload size limit.
    /// Trigger: payload larger than 50 MiB.
    PayloadTooLarge,

    /// Obtaining an upload target or transferring the payload failed.
    UploadFailed,

    /// The generation service rejected or failed the submission.
    SubmissionFailed,

    /// A status query failed while a job was being polled.
    PollingFailed,

    /// The job finished in a failed state.
    GenericFailure,

    /// A submission was attempted while another job is still in flight.
    JobInFlight,

    /// No voice is selected for the requested voice profile.
    VoiceUnavailable,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::EmptyInput => "EMPTY_INPUT",
            ErrorCode::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::UploadFailed => "UPLOAD_FAILED",
            ErrorCode::SubmissionFailed => "SUBMISSION_FAILED",
            ErrorCode::PollingFailed => "POLLING_FAILED",
            ErrorCode::GenericFailure => "GENERIC_FAILURE",
            ErrorCode::JobInFlight => "JOB_IN_FLIGHT",
            ErrorCode::VoiceUnavailable => "VOICE_UNAVAILABLE",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InsufficientBalance => "Balance is below the minimum required for generation",
            ErrorCode::EmptyInput => "Text prompt is empty",
            ErrorCode::UnsupportedMediaType => "Audio file must be MP3 or WAV",
            ErrorCode::PayloadTooLarge => "Audio file exceeds the 50MB limit",
            ErrorCode::UploadFailed => "Failed to upload audio file to storage",
            ErrorCode::SubmissionFailed => "Generation service rejected the request",
            ErrorCode::PollingFailed => "Failed to query generation status",
            ErrorCode::GenericFailure => "Generation failed",
            ErrorCode::JobInFlight => "A generation is already in progress",
            ErrorCode::VoiceUnavailable => "No voice selected for conversion",
        }
    }

    /// Returns the notification text shown to the user for this error,
    /// assuming the default credit minimum.
    pub fn user_message(&self, kind: JobKind) -> String {
        self.user_message_with_minimum(kind, DEFAULT_MIN_CREDITS)
    }

    /// Returns the notification text shown to the user for this error.
    ///
    /// Transport-level failures after submission (`PollingFailed`) read the
    /// same as a failed job; the distinction only matters for diagnostics.
    pub fn user_message_with_minimum(&self, kind: JobKind, min_credits: u32) -> String {
        match self {
            ErrorCode::InsufficientBalance => format!(
                "Not enough credits! You need at least {} credits to {}.",
                min_credits,
                kind.action()
            ),
            ErrorCode::EmptyInput => "Describe your sound effect before generating.".to_string(),
            ErrorCode::UnsupportedMediaType => "Please select an MP3 or WAV file only".to_string(),
            ErrorCode::PayloadTooLarge => "File is too large. Max size is 50MB".to_string(),
            ErrorCode::UploadFailed
            | ErrorCode::SubmissionFailed
            | ErrorCode::PollingFailed
            | ErrorCode::GenericFailure => {
                format!("Failed to {}. Please try again.", kind.failure_action())
            }
            ErrorCode::JobInFlight => {
                "Please wait for the current generation to finish.".to_string()
            }
            ErrorCode::VoiceUnavailable => "Select a voice before converting.".to_string(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Main error type for orchestrator operations.
#[derive(Debug)]
pub struct OrchestratorError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl OrchestratorError {
    /// Creates a new OrchestratorError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new OrchestratorError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an INSUFFICIENT_BALANCE error for a local balance check.
    pub fn insufficient_balance(balance: u32, required: u32) -> Self {
        Self::new(
            ErrorCode::InsufficientBalance,
            format!("Balance {} is below the required {} credits", balance, required),
        )
    }

    /// Creates an EMPTY_INPUT error.
    pub fn empty_input() -> Self {
        Self::new(ErrorCode::EmptyInput, "Text prompt cannot be empty")
    }

    /// Creates an UNSUPPORTED_MEDIA_TYPE error.
    pub fn unsupported_media_type(content_type: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedMediaType,
            format!("Unsupported audio type: {}", content_type),
        )
    }

    /// Creates a PAYLOAD_TOO_LARGE error.
    pub fn payload_too_large(size: u64, limit: u64) -> Self {
        Self::new(
            ErrorCode::PayloadTooLarge,
            format!("Payload is {} bytes (maximum {})", size, limit),
        )
    }

    /// Creates a JOB_IN_FLIGHT error.
    pub fn job_in_flight() -> Self {
        Self::new(
            ErrorCode::JobInFlight,
            "Another generation is still in flight for this surface",
        )
    }

    /// Creates a VOICE_UNAVAILABLE error.
    pub fn voice_unavailable(profile_key: &str) -> Self {
        Self::new(
            ErrorCode::VoiceUnavailable,
            format!("No voice selected for profile '{}'", profile_key),
        )
    }

    /// Creates a POLLING_FAILED error for a poll that exceeded its time budget.
    pub fn polling_timed_out(job_id: &str, elapsed_sec: u64) -> Self {
        Self::new(
            ErrorCode::PollingFailed,
            format!("Job {} still pending after {}s", job_id, elapsed_sec),
        )
    }
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using OrchestratorError.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
