//! Orchestrator configuration module.
//!
//! Contains the runtime configuration: where the generation service lives,
//! how jobs are polled, and where downloaded audio is stored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default interval between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default minimum balance required to start a generation.
pub const DEFAULT_MIN_CREDITS: u32 = 15;

/// Runtime configuration for the orchestrator.
///
/// Typically loaded from environment variables at startup, then
/// overridden by command-line arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Base URL of the generation service.
    pub api_url: String,

    /// Bearer token sent with every service request.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Interval between status queries for an in-flight job.
    pub poll_interval: Duration,

    /// Give up polling after this long. None polls until a terminal status.
    pub max_poll_duration: Option<Duration>,

    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,

    /// Minimum balance required before any network call is made.
    pub min_credits: u32,

    /// Number of finished results kept in the playback registry.
    pub registry_capacity: usize,

    /// Directory for downloaded audio. If None, uses the platform cache location.
    pub download_path: Option<PathBuf>,

    /// Service tag attached to voice conversion results.
    pub voice_service: String,

    /// Selected voice per voice profile, as `(profile, voice_id)` pairs.
    pub voices: Vec<(String, String)>,
}

impl OrchestratorConfig {
    /// Creates a new OrchestratorConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an OrchestratorConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `SOUNDGEN_API_URL` - Base URL of the generation service
    /// - `SOUNDGEN_API_KEY` - Bearer token for the service
    /// - `SOUNDGEN_POLL_INTERVAL_MS` - Status poll interval in milliseconds
    /// - `SOUNDGEN_MAX_POLL_SECS` - Upper bound on polling per job
    /// - `SOUNDGEN_REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout
    /// - `SOUNDGEN_MIN_CREDITS` - Minimum balance to allow a submission
    /// - `SOUNDGEN_REGISTRY_CAPACITY` - Results kept for playback
    /// - `SOUNDGEN_DOWNLOAD_PATH` - Directory for downloaded audio
    /// - `SOUNDGEN_VOICE_SERVICE` - Service tag for voice conversions
    /// - `SOUNDGEN_VOICES` - Voice selections, `profile=voice_id,...`
    ///
    /// Falls back to defaults for unset or unparseable variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SOUNDGEN_API_URL") {
            config.api_url = url;
        }

        if let Ok(key) = std::env::var("SOUNDGEN_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }

        if let Ok(ms) = std::env::var("SOUNDGEN_POLL_INTERVAL_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                if ms > 0 {
                    config.poll_interval = Duration::from_millis(ms);
                }
            }
        }

        if let Ok(secs) = std::env::var("SOUNDGEN_MAX_POLL_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                if secs > 0 {
                    config.max_poll_duration = Some(Duration::from_secs(secs));
                }
            }
        }

        if let Ok(secs) = std::env::var("SOUNDGEN_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                if secs > 0 {
                    config.request_timeout = Duration::from_secs(secs);
                }
            }
        }

        if let Ok(credits) = std::env::var("SOUNDGEN_MIN_CREDITS") {
            if let Ok(credits) = credits.parse::<u32>() {
                config.min_credits = credits;
            }
        }

        if let Ok(capacity) = std::env::var("SOUNDGEN_REGISTRY_CAPACITY") {
            if let Ok(capacity) = capacity.parse::<usize>() {
                if capacity > 0 {
                    config.registry_capacity = capacity;
                }
            }
        }

        if let Ok(path) = std::env::var("SOUNDGEN_DOWNLOAD_PATH") {
            config.download_path = Some(PathBuf::from(path));
        }

        if let Ok(service) = std::env::var("SOUNDGEN_VOICE_SERVICE") {
            if !service.is_empty() {
                config.voice_service = service;
            }
        }

        if let Ok(voices) = std::env::var("SOUNDGEN_VOICES") {
            config.voices = parse_voice_selections(&voices);
        }

        config
    }

    /// Returns the effective download path, using platform defaults if not specified.
    pub fn effective_download_path(&self) -> PathBuf {
        if let Some(ref path) = self.download_path {
            path.clone()
        } else {
            default_download_path()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.api_url.is_empty() {
            return Some("api_url must not be empty".to_string());
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Some(format!("api_url must be an http(s) URL, got {}", self.api_url));
        }

        if self.poll_interval.is_zero() {
            return Some("poll_interval must be > 0".to_string());
        }

        if let Some(max) = self.max_poll_duration {
            if max < self.poll_interval {
                return Some(format!(
                    "max_poll_duration ({:?}) is shorter than poll_interval ({:?})",
                    max, self.poll_interval
                ));
            }
        }

        if self.registry_capacity == 0 {
            return Some("registry_capacity must be > 0".to_string());
        }

        None
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            api_key: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_duration: None,
            request_timeout: Duration::from_secs(30),
            min_credits: DEFAULT_MIN_CREDITS,
            registry_capacity: 100,
            download_path: None,
            voice_service: "seedvc".to_string(),
            voices: Vec::new(),
        }
    }
}

/// Parses `profile=voice_id` pairs separated by commas.
///
/// Malformed entries are skipped.
pub fn parse_voice_selections(input: &str) -> Vec<(String, String)> {
    input
        .split(',')
        .filter_map(|entry| {
            let (profile, voice) = entry.split_once('=')?;
            let (profile, voice) = (profile.trim(), voice.trim());
            if profile.is_empty() || voice.is_empty() {
                return None;
            }
            Some((profile.to_string(), voice.to_string()))
        })
        .collect()
}

/// Returns the platform-specific default download path.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Caches/soundgen/downloads
/// - Linux: ~/.cache/soundgen/downloads
/// - Windows: C:\Users\<user>\AppData\Local\soundgen\cache\downloads
fn default_download_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "soundgen") {
        proj_dirs.cache_dir().join("downloads")
    } else {
        PathBuf::from("./downloads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = OrchestratorConfig::new();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.min_credits, 15);
        assert!(config.max_poll_duration.is_none());
        assert_eq!(config.voice_service, "seedvc");
        assert!(config.validate().is_none());
    }

    #[test]
    fn config_validation() {
        let mut config = OrchestratorConfig::new();
        config.api_url = "ftp://example.com".to_string();
        assert!(config.validate().is_some());

        config.api_url = "https://api.example.com".to_string();
        assert!(config.validate().is_none());

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_some());

        config.poll_interval = Duration::from_secs(1);
        config.max_poll_duration = Some(Duration::from_millis(100));
        assert!(config.validate().is_some());
    }

    #[test]
    fn voice_selection_parsing() {
        let voices = parse_voice_selections("seedvc=andreas, styletts2 = anaya ,broken,=x,y=");
        assert_eq!(
            voices,
            vec![
                ("seedvc".to_string(), "andreas".to_string()),
                ("styletts2".to_string(), "anaya".to_string()),
            ]
        );
    }

    #[test]
    fn effective_download_path() {
        let config = OrchestratorConfig::new();
        assert!(!config.effective_download_path().as_os_str().is_empty());

        let config = OrchestratorConfig {
            download_path: Some(PathBuf::from("/tmp/audio")),
            ..Default::default()
        };
        assert_eq!(config.effective_download_path(), PathBuf::from("/tmp/audio"));
    }

    #[test]
    fn api_key_is_not_serialized() {
        let config = OrchestratorConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
