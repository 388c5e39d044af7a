//! PlayableResult type representing a finished audio artifact.
//!
//! A PlayableResult is built once from a succeeded job and handed to the
//! playback registry; the orchestrator keeps no copy.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::job::system_time_serde;

/// Maximum characters of a text prompt used as a result title.
const TITLE_MAX_CHARS: usize = 50;

/// Duration label attached to every result. Actual duration is not measured.
pub const DURATION_PLACEHOLDER: &str = "0:30";

/// Title used for converted files without a name.
pub const FILE_TITLE_FALLBACK: &str = "Voice changed audio";

/// A finished audio artifact ready for playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayableResult {
    /// Job identifier the audio was produced by.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Where the audio can be fetched.
    pub audio_url: String,

    /// Voice the audio was converted to; empty for sound effects.
    pub source_voice: String,

    /// Display duration.
    pub duration_label: String,

    /// When the result was built.
    #[serde(with = "system_time_serde")]
    pub created_at: SystemTime,

    /// Service that produced the audio, e.g. `make-an-audio` or `seedvc`.
    pub service_tag: String,
}

/// Builds a result title from prompt content.
///
/// Content longer than 50 characters is cut at 50 and suffixed with `...`.
pub fn text_title(content: &str) -> String {
    if content.chars().count() > TITLE_MAX_CHARS {
        let head: String = content.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_title_is_unmodified() {
        let content = "Ocean waves crashing against a rocky shore";
        assert_eq!(text_title(content), content);
    }

    #[test]
    fn exactly_fifty_chars_is_unmodified() {
        let content = "x".repeat(50);
        assert_eq!(text_title(&content), content);
    }

    #[test]
    fn long_title_is_truncated_with_marker() {
        let content = "y".repeat(51);
        let title = text_title(&content);
        assert_eq!(title, format!("{}...", "y".repeat(50)));
    }
}
