//! Result handoff: turns a finished job into exactly one published result
//! or exactly one failure notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info};

use crate::error::ErrorCode;
use crate::registry::PlaybackRegistry;
use crate::types::{
    text_title, Job, JobKind, PlayableResult, TextPrompt, DURATION_PLACEHOLDER,
    FILE_TITLE_FALLBACK,
};

use super::notify::{Notification, Notifier};

/// Service tag for text-to-sound-effect results.
pub const SOUND_EFFECT_SERVICE: &str = "make-an-audio";

/// Request details carried from submission to the finished result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub kind: JobKind,
    pub title: String,
    pub source_voice: String,
    pub service_tag: String,
}

impl RequestMeta {
    /// Metadata for a text prompt job.
    pub fn for_text(prompt: &TextPrompt) -> Self {
        Self {
            kind: JobKind::SoundEffect,
            title: text_title(prompt.as_str()),
            source_voice: String::new(),
            service_tag: SOUND_EFFECT_SERVICE.to_string(),
        }
    }

    /// Metadata for a voice conversion job.
    pub fn for_file(name: Option<&str>, voice_id: &str, service_tag: &str) -> Self {
        let title = name
            .filter(|n| !n.is_empty())
            .unwrap_or(FILE_TITLE_FALLBACK)
            .to_string();
        Self {
            kind: JobKind::VoiceConversion,
            title,
            source_voice: voice_id.to_string(),
            service_tag: service_tag.to_string(),
        }
    }
}

/// Builds the playable result for a succeeded job.
pub fn build_result(job: &Job, audio_url: &str, meta: &RequestMeta) -> PlayableResult {
    PlayableResult {
        id: job.id.clone(),
        title: meta.title.clone(),
        audio_url: audio_url.to_string(),
        source_voice: meta.source_voice.clone(),
        duration_label: DURATION_PLACEHOLDER.to_string(),
        created_at: SystemTime::now(),
        service_tag: meta.service_tag.clone(),
    }
}

/// Settles one job. The first call to `on_success` or `on_failure` wins;
/// every later call is a no-op that returns false.
pub struct ResultHandoff {
    registry: Arc<dyn PlaybackRegistry>,
    notifier: Arc<dyn Notifier>,
    settled: AtomicBool,
}

impl ResultHandoff {
    pub fn new(registry: Arc<dyn PlaybackRegistry>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            registry,
            notifier,
            settled: AtomicBool::new(false),
        }
    }

    /// Returns true once the job has been published or reported.
    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::SeqCst)
    }

    fn settle(&self) -> bool {
        self.settled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Publishes the result for a succeeded job.
    pub fn on_success(&self, job: &Job, audio_url: &str, meta: &RequestMeta) -> bool {
        if !self.settle() {
            debug!(job_id = %job.id, "Ignoring repeated success delivery");
            return false;
        }
        let result = build_result(job, audio_url, meta);
        info!(job_id = %job.id, title = %result.title, "Publishing result");
        self.registry.publish(result);
        true
    }

    /// Emits the failure notification for a job.
    pub fn on_failure(&self, job: &Job, kind: JobKind, code: ErrorCode) -> bool {
        if !self.settle() {
            debug!(job_id = %job.id, %code, "Ignoring repeated failure delivery");
            return false;
        }
        self.notifier
            .notify(Notification::failure(Some(&job.id), kind, code));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        published: Mutex<Vec<PlayableResult>>,
        notified: Mutex<Vec<Notification>>,
    }

    impl PlaybackRegistry for Recorder {
        fn publish(&self, result: PlayableResult) {
            self.published.lock().unwrap().push(result);
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, notification: Notification) {
            self.notified.lock().unwrap().push(notification);
        }
    }

    fn handoff() -> (Arc<Recorder>, ResultHandoff) {
        let recorder = Arc::new(Recorder::default());
        let handoff = ResultHandoff::new(recorder.clone(), recorder.clone());
        (recorder, handoff)
    }

    #[test]
    fn text_meta_truncates_title() {
        let meta = RequestMeta::for_text(&TextPrompt::capture(&"a".repeat(60)));
        assert_eq!(meta.title, format!("{}...", "a".repeat(50)));
        assert_eq!(meta.source_voice, "");
        assert_eq!(meta.service_tag, "make-an-audio");
        assert_eq!(meta.kind, JobKind::SoundEffect);
    }

    #[test]
    fn file_meta_falls_back_to_default_title() {
        assert_eq!(
            RequestMeta::for_file(None, "v1", "seedvc").title,
            "Voice changed audio"
        );
        assert_eq!(
            RequestMeta::for_file(Some(""), "v1", "seedvc").title,
            "Voice changed audio"
        );
        let meta = RequestMeta::for_file(Some("take1.wav"), "v1", "seedvc");
        assert_eq!(meta.title, "take1.wav");
        assert_eq!(meta.source_voice, "v1");
        assert_eq!(meta.kind, JobKind::VoiceConversion);
    }

    #[test]
    fn build_result_fills_fields() {
        let job = Job::new("j1");
        let meta = RequestMeta::for_text(&TextPrompt::capture("Thunder"));
        let result = build_result(&job, "https://x/a.mp3", &meta);
        assert_eq!(result.id, "j1");
        assert_eq!(result.title, "Thunder");
        assert_eq!(result.audio_url, "https://x/a.mp3");
        assert_eq!(result.duration_label, "0:30");
    }

    #[test]
    fn success_publishes_once() {
        let (recorder, handoff) = handoff();
        let job = Job::new("j1");
        let meta = RequestMeta::for_text(&TextPrompt::capture("Thunder"));

        assert!(handoff.on_success(&job, "https://x/a.mp3", &meta));
        assert!(!handoff.on_success(&job, "https://x/a.mp3", &meta));
        assert!(!handoff.on_failure(&job, JobKind::SoundEffect, ErrorCode::GenericFailure));

        assert_eq!(recorder.published.lock().unwrap().len(), 1);
        assert!(recorder.notified.lock().unwrap().is_empty());
        assert!(handoff.is_settled());
    }

    #[test]
    fn failure_notifies_once() {
        let (recorder, handoff) = handoff();
        let job = Job::new("j1");

        assert!(handoff.on_failure(&job, JobKind::VoiceConversion, ErrorCode::GenericFailure));
        assert!(!handoff.on_failure(&job, JobKind::VoiceConversion, ErrorCode::GenericFailure));

        let notified = recorder.notified.lock().unwrap();
        assert_eq!(notified.len(), 1);
        assert_eq!(
            notified[0],
            Notification::failure(Some("j1"), JobKind::VoiceConversion, ErrorCode::GenericFailure)
        );
        assert!(recorder.published.lock().unwrap().is_empty());
    }
}
