//! Captured user input and the requests built from it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::job::JobKind;

/// Maximum number of characters accepted in a text prompt.
pub const MAX_PROMPT_CHARS: usize = 500;

/// Audio content types accepted for voice conversion.
pub const ALLOWED_AUDIO_TYPES: [&str; 2] = ["audio/mp3", "audio/wav"];

/// A text prompt as captured at the input layer.
///
/// Capture truncates to [`MAX_PROMPT_CHARS`] characters, so a prompt can
/// never exceed the limit by the time it is submitted. Blank prompts are
/// representable and rejected by the validator instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TextPrompt(String);

impl TextPrompt {
    /// Captures raw input, truncating anything past the character limit.
    pub fn capture(input: &str) -> Self {
        Self(input.chars().take(MAX_PROMPT_CHARS).collect())
    }

    /// Returns the captured content.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the prompt is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Number of characters (not bytes) in the prompt.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl From<String> for TextPrompt {
    fn from(input: String) -> Self {
        Self::capture(&input)
    }
}

impl From<TextPrompt> for String {
    fn from(prompt: TextPrompt) -> Self {
        prompt.0
    }
}

/// An audio file selected for voice conversion.
#[derive(Clone)]
pub struct AudioFile {
    /// Original file name, if known.
    pub name: Option<String>,
    /// Declared MIME type, e.g. `audio/wav`.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for AudioFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl AudioFile {
    /// Creates an AudioFile from in-memory contents.
    pub fn new(name: Option<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name,
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads an audio file from disk.
    ///
    /// When `content_type` is None the type is inferred from the file
    /// extension; unknown extensions are declared as
    /// `application/octet-stream` and left for the validator to reject.
    pub async fn from_path(path: &Path, content_type: Option<&str>) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let content_type = content_type
            .map(str::to_string)
            .or_else(|| infer_content_type(path).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Infers an accepted audio content type from a file extension.
pub fn infer_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "mp3" => Some("audio/mp3"),
        "wav" => Some("audio/wav"),
        _ => None,
    }
}

/// A submission as handed to the orchestrator, before validation.
#[derive(Debug, Clone)]
pub enum Submission {
    /// Sound effect from a text description.
    Text(TextPrompt),
    /// Voice conversion of an audio file using the voice selected for `profile_key`.
    File {
        file: AudioFile,
        profile_key: String,
    },
}

impl Submission {
    /// The kind of job this submission creates.
    pub fn kind(&self) -> JobKind {
        match self {
            Submission::Text(_) => JobKind::SoundEffect,
            Submission::File { .. } => JobKind::VoiceConversion,
        }
    }
}

/// The request sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationRequest {
    /// Text content, already bounded by capture.
    Text { content: String },
    /// Reference to an uploaded payload plus the voice to convert to.
    FileReference { storage_key: String, voice_id: String },
}
