//! CLI argument parser.
//!
//! Provides a one-shot command-line mode that submits a single job and waits
//! for its outcome, plus the switch into daemon mode.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::config::OrchestratorConfig;
use crate::types::PlayableResult;

/// Extension used when the result URL does not carry one.
const DEFAULT_AUDIO_EXTENSION: &str = "mp3";

/// soundgen-daemon: sound effect generation and voice conversion client
#[derive(Parser, Debug)]
#[command(name = "soundgen-daemon")]
#[command(about = "Sound effect generation and voice conversion against a remote generation service")]
#[command(version)]
pub struct Cli {
    /// Text describing the sound effect to generate
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Audio file (MP3 or WAV) to convert to the selected voice
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// MIME type of the audio file; inferred from the extension if omitted
    #[arg(long, requires = "file")]
    pub content_type: Option<String>,

    /// Voice profile used to resolve the target voice
    #[arg(long)]
    pub voice_profile: Option<String>,

    /// Select VOICE_ID for the voice profile before submitting
    #[arg(long)]
    pub voice: Option<String>,

    /// Current credit balance
    #[arg(short, long, default_value = "0")]
    pub credits: u32,

    /// Download the finished audio into the download directory
    #[arg(short, long)]
    pub download: bool,

    /// Base URL of the generation service (overrides SOUNDGEN_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Bearer token for the generation service (overrides SOUNDGEN_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Status poll interval in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: Option<u64>,

    /// Run in daemon mode (JSON-RPC over stdio)
    #[arg(long)]
    pub daemon: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if running in CLI mode (not daemon mode).
    pub fn is_cli_mode(&self) -> bool {
        !self.daemon && (self.text.is_some() || self.file.is_some())
    }

    /// Returns true if running in daemon mode.
    pub fn is_daemon_mode(&self) -> bool {
        self.daemon
    }

    /// Applies command-line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut OrchestratorConfig) {
        if let Some(ref url) = self.api_url {
            config.api_url = url.clone();
        }
        if let Some(ref key) = self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ref voice) = self.voice {
            let profile = self.profile(config);
            config.voices.retain(|(p, _)| *p != profile);
            config.voices.push((profile, voice.clone()));
        }
    }

    /// Returns the voice profile to use, falling back to the configured voice service.
    pub fn profile(&self, config: &OrchestratorConfig) -> String {
        self.voice_profile
            .clone()
            .unwrap_or_else(|| config.voice_service.clone())
    }
}

/// Returns where a downloaded result is written inside `dir`.
///
/// The file is named after the job id, keeping the extension of the result
/// URL when it has a plausible one.
pub fn download_target(dir: &Path, result: &PlayableResult) -> PathBuf {
    let extension = result
        .audio_url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_AUDIO_EXTENSION);

    let stem: String = result
        .id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    dir.join(format!("{}.{}", stem, extension))
}
