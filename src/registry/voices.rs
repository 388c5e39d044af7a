//! Voice selections backed by configuration.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::VoiceResolver;

/// Voice selection per profile, set from configuration or by a front end.
#[derive(Debug, Default)]
pub struct StaticVoiceCatalog {
    selected: RwLock<HashMap<String, String>>,
}

impl StaticVoiceCatalog {
    /// Creates a catalog from `(profile, voice_id)` pairs.
    pub fn new(selections: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            selected: RwLock::new(selections.into_iter().collect()),
        }
    }

    /// Selects `voice_id` for `profile_key`, replacing any previous selection.
    ///
    /// Jobs already submitted keep the voice they resolved at submission.
    pub fn select(&self, profile_key: impl Into<String>, voice_id: impl Into<String>) {
        self.selected
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile_key.into(), voice_id.into());
    }
}

impl VoiceResolver for StaticVoiceCatalog {
    fn resolve_voice(&self, profile_key: &str) -> Option<String> {
        self.selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(profile_key)
            .cloned()
    }
}
