//! Collaborators the orchestrator hands results to and reads voices from.
//!
//! - [`PlaybackRegistry`]: shared store of finished audio, append-only from
//!   the orchestrator's side
//! - [`VoiceResolver`]: read-only lookup of the voice selected for a profile

pub mod tracks;
pub mod voices;

use crate::types::PlayableResult;

// Re-export commonly used types
pub use tracks::TrackRegistry;
pub use voices::StaticVoiceCatalog;

/// Shared store of finished audio available for playback.
///
/// The orchestrator calls `publish` at most once per completed job and
/// gives up ownership of the result.
pub trait PlaybackRegistry: Send + Sync {
    /// Accepts a finished result.
    fn publish(&self, result: PlayableResult);
}

/// Read-only lookup of the voice currently selected for a voice profile.
pub trait VoiceResolver: Send + Sync {
    /// Returns the selected voice id for `profile_key`, if any.
    fn resolve_voice(&self, profile_key: &str) -> Option<String>;
}
