//! Precondition checks run before any network call.

use crate::config::DEFAULT_MIN_CREDITS;
use crate::error::{OrchestratorError, Result};
use crate::types::{Submission, ALLOWED_AUDIO_TYPES};

/// Largest accepted upload, in bytes (50 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Checks balance and payload constraints for a submission.
///
/// Pure and synchronous: nothing here touches the network, so an invalid
/// request never spends quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreconditionValidator {
    min_balance: u32,
}

impl Default for PreconditionValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CREDITS)
    }
}

impl PreconditionValidator {
    /// Creates a validator requiring at least `min_balance` credits.
    pub fn new(min_balance: u32) -> Self {
        Self { min_balance }
    }

    /// Minimum balance this validator accepts.
    pub fn min_balance(&self) -> u32 {
        self.min_balance
    }

    /// Validates a submission against the caller's balance.
    ///
    /// Input shape is checked first (blank prompt, media type, size), then
    /// the balance.
    pub fn validate(&self, submission: &Submission, balance: u32) -> Result<()> {
        match submission {
            Submission::Text(prompt) => {
                if prompt.is_blank() {
                    return Err(OrchestratorError::empty_input());
                }
            }
            Submission::File { file, .. } => {
                if !ALLOWED_AUDIO_TYPES.contains(&file.content_type.as_str()) {
                    return Err(OrchestratorError::unsupported_media_type(&file.content_type));
                }
                if file.size() > MAX_UPLOAD_BYTES {
                    return Err(OrchestratorError::payload_too_large(
                        file.size(),
                        MAX_UPLOAD_BYTES,
                    ));
                }
            }
        }

        if balance < self.min_balance {
            return Err(OrchestratorError::insufficient_balance(
                balance,
                self.min_balance,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::{AudioFile, TextPrompt};

    fn text(content: &str) -> Submission {
        Submission::Text(TextPrompt::capture(content))
    }

    fn file(content_type: &str, size: usize) -> Submission {
        Submission::File {
            file: AudioFile::new(Some("voice.wav".to_string()), content_type, vec![0u8; size]),
            profile_key: "seedvc".to_string(),
        }
    }

    fn code(result: Result<()>) -> ErrorCode {
        result.unwrap_err().code
    }

    #[test]
    fn blank_text_is_empty_input() {
        let validator = PreconditionValidator::default();
        for content in ["", " ", "\n\t  "] {
            assert_eq!(code(validator.validate(&text(content), 100)), ErrorCode::EmptyInput);
        }
    }

    #[test]
    fn low_balance_rejected_for_every_kind() {
        let validator = PreconditionValidator::default();
        for balance in [0, 1, 10, 14] {
            assert_eq!(
                code(validator.validate(&text("Creaky door"), balance)),
                ErrorCode::InsufficientBalance
            );
            assert_eq!(
                code(validator.validate(&file("audio/wav", 16), balance)),
                ErrorCode::InsufficientBalance
            );
        }
    }

    #[test]
    fn threshold_balance_accepted() {
        let validator = PreconditionValidator::default();
        assert!(validator.validate(&text("Creaky door"), 15).is_ok());
        assert!(validator.validate(&file("audio/mp3", 16), 15).is_ok());
    }

    #[test]
    fn unsupported_media_type() {
        let validator = PreconditionValidator::default();
        for content_type in ["audio/ogg", "audio/mpeg", "video/mp4", ""] {
            assert_eq!(
                code(validator.validate(&file(content_type, 16), 100)),
                ErrorCode::UnsupportedMediaType
            );
        }
    }

    #[test]
    fn size_limit_is_inclusive() {
        let validator = PreconditionValidator::default();
        let limit = MAX_UPLOAD_BYTES as usize;
        assert!(validator.validate(&file("audio/wav", limit), 100).is_ok());
        assert_eq!(
            code(validator.validate(&file("audio/wav", limit + 1), 100)),
            ErrorCode::PayloadTooLarge
        );
    }

    #[test]
    fn custom_minimum() {
        let validator = PreconditionValidator::new(0);
        assert_eq!(validator.min_balance(), 0);
        assert!(validator.validate(&text("rain"), 0).is_ok());
    }
}
