//! HTTP client for the generation service.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST /v1/sound-effects` with `{"text": ...}`
//! - `POST /v1/speech-to-speech` with `{"s3Key": ..., "voiceId": ...}`
//! - `POST /v1/upload-url` with `{"contentType": ...}`
//! - `GET  /v1/generations/{id}/status`
//!
//! Refusals for lack of credits arrive as HTTP 402 or as an error body with
//! code `INSUFFICIENT_CREDITS`; both become [`ServiceError::InsufficientCredits`].

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{
    GenerationService, JobCreated, PayloadUploader, ServiceError, StatusReport, UploadTarget,
};
use crate::config::OrchestratorConfig;

/// Error code the service uses for credit refusals.
const INSUFFICIENT_CREDITS_CODE: &str = "INSUFFICIENT_CREDITS";

/// Error envelope returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Generation service reached over HTTP.
#[derive(Clone)]
pub struct HttpGenerationService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpGenerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerationService")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpGenerationService {
    /// Creates a client from configuration.
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ServiceError> {
        let request = self.authorized(self.client.post(self.endpoint(path)).json(&body));
        let response = check_status(request.send().await?).await?;
        decode(response).await
    }

    /// Downloads finished audio to `dest`, returning the number of bytes written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, ServiceError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut response = check_status(self.client.get(url).send().await?).await?;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut downloaded: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(url, bytes = downloaded, dest = %dest.display(), "Downloaded result audio");
        Ok(downloaded)
    }
}

/// Maps non-success responses to errors, classifying credit refusals.
async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let envelope = serde_json::from_str::<ErrorEnvelope>(&text).ok();
    let code = envelope.as_ref().and_then(|e| e.error.code.clone());
    let message = envelope
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| text.clone());

    if status == StatusCode::PAYMENT_REQUIRED || code.as_deref() == Some(INSUFFICIENT_CREDITS_CODE)
    {
        return Err(ServiceError::InsufficientCredits(message));
    }

    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn submit_text_job(&self, content: &str) -> Result<JobCreated, ServiceError> {
        self.post_json("/v1/sound-effects", serde_json::json!({ "text": content }))
            .await
    }

    async fn submit_file_job(
        &self,
        storage_key: &str,
        voice_id: &str,
    ) -> Result<JobCreated, ServiceError> {
        self.post_json(
            "/v1/speech-to-speech",
            serde_json::json!({ "s3Key": storage_key, "voiceId": voice_id }),
        )
        .await
    }

    async fn request_upload_target(
        &self,
        content_type: &str,
    ) -> Result<UploadTarget, ServiceError> {
        self.post_json(
            "/v1/upload-url",
            serde_json::json!({ "contentType": content_type }),
        )
        .await
    }

    async fn get_job_status(&self, job_id: &str) -> Result<StatusReport, ServiceError> {
        let path = format!("/v1/generations/{}/status", job_id);
        let request = self.authorized(self.client.get(self.endpoint(&path)));
        let response = check_status(request.send().await?).await?;
        decode(response).await
    }
}

#[async_trait]
impl PayloadUploader for HttpGenerationService {
    async fn put(
        &self,
        target: &UploadTarget,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ServiceError> {
        // Pre-signed targets carry their own credentials; no bearer token.
        let response = self
            .client
            .put(&target.write_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status {
                status: status.as_u16(),
                message: "Upload rejected by storage".to_string(),
            })
        }
    }
}
