//! Scripted service doubles shared by the generation unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::service::{
    GenerationService, JobCreated, PayloadUploader, ServiceError, StatusReport, UploadTarget,
};

pub(crate) fn pending() -> Result<StatusReport, ServiceError> {
    Ok(StatusReport::default())
}

pub(crate) fn succeeded(url: &str) -> Result<StatusReport, ServiceError> {
    Ok(StatusReport {
        success: Some(true),
        audio_url: Some(url.to_string()),
    })
}

pub(crate) fn failed() -> Result<StatusReport, ServiceError> {
    Ok(StatusReport {
        success: Some(false),
        audio_url: None,
    })
}

pub(crate) fn transport_error() -> Result<StatusReport, ServiceError> {
    Err(ServiceError::Decode("connection reset".to_string()))
}

/// Service whose responses are scripted per test and whose calls are counted.
#[derive(Default)]
pub(crate) struct ScriptedService {
    statuses: Mutex<VecDeque<Result<StatusReport, ServiceError>>>,
    status_delay: Option<Duration>,
    submit_delay: Option<Duration>,
    submit_error: Mutex<Option<ServiceError>>,
    target_error: Mutex<Option<ServiceError>>,
    reject_put: bool,
    throttled: bool,
    pub status_calls: AtomicUsize,
    pub text_submissions: AtomicUsize,
    pub file_submissions: AtomicUsize,
    pub target_requests: AtomicUsize,
    pub puts: AtomicUsize,
    pub last_file_job: Mutex<Option<(String, String)>>,
}

impl ScriptedService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Status responses in order; once exhausted every query reports pending.
    pub(crate) fn with_statuses(
        mut self,
        statuses: Vec<Result<StatusReport, ServiceError>>,
    ) -> Self {
        self.statuses = Mutex::new(statuses.into());
        self
    }

    pub(crate) fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub(crate) fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    pub(crate) fn failing_submit(self, error: ServiceError) -> Self {
        *self.submit_error.lock().unwrap() = Some(error);
        self
    }

    pub(crate) fn failing_upload_target(self, error: ServiceError) -> Self {
        *self.target_error.lock().unwrap() = Some(error);
        self
    }

    pub(crate) fn rejecting_put(mut self) -> Self {
        self.reject_put = true;
        self
    }

    pub(crate) fn throttled(mut self) -> Self {
        self.throttled = true;
        self
    }

    pub(crate) fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn created(&self) -> Result<JobCreated, ServiceError> {
        if let Some(error) = self.submit_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(JobCreated {
            job_id: "j1".to_string(),
            throttled: self.throttled,
        })
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn submit_text_job(&self, _content: &str) -> Result<JobCreated, ServiceError> {
        self.text_submissions.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        self.created()
    }

    async fn submit_file_job(
        &self,
        storage_key: &str,
        voice_id: &str,
    ) -> Result<JobCreated, ServiceError> {
        self.file_submissions.fetch_add(1, Ordering::SeqCst);
        *self.last_file_job.lock().unwrap() = Some((storage_key.to_string(), voice_id.to_string()));
        self.created()
    }

    async fn request_upload_target(
        &self,
        content_type: &str,
    ) -> Result<UploadTarget, ServiceError> {
        self.target_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.target_error.lock().unwrap().take() {
            return Err(error);
        }
        let n = Self::count(&self.target_requests);
        Ok(UploadTarget {
            write_url: format!("https://storage.test/put/{}", n),
            storage_key: format!("inputs/{}-{}", n, content_type.replace('/', "-")),
        })
    }

    async fn get_job_status(&self, _job_id: &str) -> Result<StatusReport, ServiceError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(pending)
    }
}

#[async_trait]
impl PayloadUploader for ScriptedService {
    async fn put(
        &self,
        _target: &UploadTarget,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<(), ServiceError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.reject_put {
            return Err(ServiceError::Status {
                status: 403,
                message: "Upload rejected by storage".to_string(),
            });
        }
        Ok(())
    }
}
