//! Playback registry with LRU eviction.
//!
//! Keeps finished results in memory, keyed by job id, so presentation
//! layers can list and play them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::debug;

use super::PlaybackRegistry;
use crate::types::PlayableResult;

/// Maximum number of results to keep.
const DEFAULT_MAX_ENTRIES: usize = 100;

/// In-memory playback registry with LRU eviction policy.
pub struct TrackRegistry {
    inner: Mutex<Entries>,
}

struct Entries {
    /// Results indexed by id.
    results: HashMap<String, RegistryEntry>,
    /// Maximum number of entries to keep.
    max_entries: usize,
}

/// A stored result with access timestamp.
struct RegistryEntry {
    result: PlayableResult,
    last_accessed: Instant,
}

impl TrackRegistry {
    /// Creates a new registry with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Creates a new registry with specified capacity.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Entries {
                results: HashMap::new(),
                max_entries: max_entries.max(1),
            }),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of a result by id, updating its access time.
    pub fn get(&self, id: &str) -> Option<PlayableResult> {
        let mut entries = self.entries();
        let entry = entries.results.get_mut(id)?;
        entry.last_accessed = Instant::now();
        Some(entry.result.clone())
    }

    /// Checks if a result id exists in the registry.
    pub fn contains(&self, id: &str) -> bool {
        self.entries().results.contains_key(id)
    }

    /// Returns the number of stored results.
    pub fn len(&self) -> usize {
        self.entries().results.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries().results.is_empty()
    }

    /// Returns all results, newest first.
    pub fn list(&self) -> Vec<PlayableResult> {
        let entries = self.entries();
        let mut results: Vec<PlayableResult> =
            entries.results.values().map(|e| e.result.clone()).collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results
    }

    /// Removes a specific result.
    pub fn remove(&self, id: &str) -> Option<PlayableResult> {
        self.entries().results.remove(id).map(|entry| entry.result)
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries().results.clear();
    }
}

impl Entries {
    /// Evicts the least recently used entry.
    fn evict_lru(&mut self) -> Option<PlayableResult> {
        let oldest_key = self
            .results
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(k, _)| k.clone())?;

        self.results.remove(&oldest_key).map(|entry| entry.result)
    }
}

impl PlaybackRegistry for TrackRegistry {
    fn publish(&self, result: PlayableResult) {
        let mut entries = self.entries();

        if entries.results.len() >= entries.max_entries && !entries.results.contains_key(&result.id)
        {
            if let Some(evicted) = entries.evict_lru() {
                debug!(id = %evicted.id, "Evicted result from playback registry");
            }
        }

        entries.results.insert(
            result.id.clone(),
            RegistryEntry {
                result,
                last_accessed: Instant::now(),
            },
        );
    }
}

impl Default for TrackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
