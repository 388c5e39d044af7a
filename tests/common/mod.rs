//! Shared doubles for orchestrator integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use soundgen_daemon::config::OrchestratorConfig;
use soundgen_daemon::generation::{GenerationOrchestrator, Notification, Notifier};
use soundgen_daemon::registry::{PlaybackRegistry, StaticVoiceCatalog};
use soundgen_daemon::service::{
    GenerationService, JobCreated, PayloadUploader, ServiceError, StatusReport, UploadTarget,
};
use soundgen_daemon::types::PlayableResult;

pub const JOB_ID: &str = "sfx-001";

pub fn pending() -> Result<StatusReport, ServiceError> {
    Ok(StatusReport::default())
}

pub fn success(url: &str) -> Result<StatusReport, ServiceError> {
    Ok(StatusReport {
        success: Some(true),
        audio_url: Some(url.to_string()),
    })
}

pub fn failure() -> Result<StatusReport, ServiceError> {
    Ok(StatusReport {
        success: Some(false),
        audio_url: None,
    })
}

pub fn network_error() -> Result<StatusReport, ServiceError> {
    Err(ServiceError::Status {
        status: 503,
        message: "service unavailable".to_string(),
    })
}

/// In-memory generation service with scripted status responses.
#[derive(Default)]
pub struct MockService {
    statuses: Mutex<VecDeque<Result<StatusReport, ServiceError>>>,
    status_delay: Mutex<Option<Duration>>,
    submit_error: Mutex<Option<ServiceError>>,
    pub put_status: Mutex<Option<u16>>,
    pub throttled: Mutex<bool>,
    pub status_calls: AtomicUsize,
    pub upload_target_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    pub text_jobs: Mutex<Vec<String>>,
    pub file_jobs: Mutex<Vec<(String, String)>>,
}

impl MockService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, statuses: Vec<Result<StatusReport, ServiceError>>) {
        *self.statuses.lock().unwrap() = statuses.into();
    }

    pub fn delay_status(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_submit(&self, error: ServiceError) {
        *self.submit_error.lock().unwrap() = Some(error);
    }

    pub fn reject_put(&self, status: u16) {
        *self.put_status.lock().unwrap() = Some(status);
    }

    pub fn throttle(&self) {
        *self.throttled.lock().unwrap() = true;
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn created(&self) -> Result<JobCreated, ServiceError> {
        if let Some(error) = self.submit_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(JobCreated {
            job_id: JOB_ID.to_string(),
            throttled: *self.throttled.lock().unwrap(),
        })
    }
}

#[async_trait]
impl GenerationService for MockService {
    async fn submit_text_job(&self, content: &str) -> Result<JobCreated, ServiceError> {
        self.text_jobs.lock().unwrap().push(content.to_string());
        self.created()
    }

    async fn submit_file_job(
        &self,
        storage_key: &str,
        voice_id: &str,
    ) -> Result<JobCreated, ServiceError> {
        self.file_jobs
            .lock()
            .unwrap()
            .push((storage_key.to_string(), voice_id.to_string()));
        self.created()
    }

    async fn request_upload_target(
        &self,
        _content_type: &str,
    ) -> Result<UploadTarget, ServiceError> {
        let n = self.upload_target_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(UploadTarget {
            write_url: format!("https://storage.test/upload/{}", n),
            storage_key: format!("uploads/{}", n),
        })
    }

    async fn get_job_status(&self, _job_id: &str) -> Result<StatusReport, ServiceError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.status_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(pending)
    }
}

#[async_trait]
impl PayloadUploader for MockService {
    async fn put(
        &self,
        _target: &UploadTarget,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<(), ServiceError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        match *self.put_status.lock().unwrap() {
            Some(status) => Err(ServiceError::Status {
                status,
                message: "rejected".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Notifier that records everything it is shown.
#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.lock().unwrap().push(notification);
    }
}

/// Registry that records every publish call.
#[derive(Default)]
pub struct RecordingRegistry(Mutex<Vec<PlayableResult>>);

impl RecordingRegistry {
    pub fn all(&self) -> Vec<PlayableResult> {
        self.0.lock().unwrap().clone()
    }
}

impl PlaybackRegistry for RecordingRegistry {
    fn publish(&self, result: PlayableResult) {
        self.0.lock().unwrap().push(result);
    }
}

pub struct Harness {
    pub service: Arc<MockService>,
    pub notifier: Arc<RecordingNotifier>,
    pub registry: Arc<RecordingRegistry>,
    pub voices: Arc<StaticVoiceCatalog>,
    pub orchestrator: GenerationOrchestrator,
}

pub fn harness() -> Harness {
    harness_with(OrchestratorConfig::default())
}

pub fn harness_with(config: OrchestratorConfig) -> Harness {
    let service = MockService::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let registry = Arc::new(RecordingRegistry::default());
    let voices = Arc::new(StaticVoiceCatalog::new([(
        "seedvc".to_string(),
        "andreas".to_string(),
    )]));
    let orchestrator = GenerationOrchestrator::new(
        service.clone(),
        service.clone(),
        registry.clone(),
        notifier.clone(),
        voices.clone(),
        &config,
    );
    Harness {
        service,
        notifier,
        registry,
        voices,
        orchestrator,
    }
}
