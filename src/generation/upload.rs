//! Upload pipeline for file-based jobs.
//!
//! Obtains a fresh upload target and writes the payload to it. Targets are
//! pre-signed and single-use, so a failed transfer is not retried: a
//! partial write cannot be resumed against the same target.

use tracing::{debug, warn};

use crate::error::{ErrorCode, OrchestratorError, Result};
use crate::service::{GenerationService, PayloadUploader};
use crate::types::AudioFile;

/// Uploads `file` and returns the storage key to submit.
///
/// Consumes the file so its bytes are released once the transfer ends.
pub async fn upload(
    service: &dyn GenerationService,
    uploader: &dyn PayloadUploader,
    file: AudioFile,
) -> Result<String> {
    let target = service
        .request_upload_target(&file.content_type)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to obtain upload target");
            OrchestratorError::with_source(
                ErrorCode::UploadFailed,
                "Failed to obtain an upload target",
                e,
            )
        })?;

    let size = file.size();
    debug!(storage_key = %target.storage_key, size, "Uploading payload");

    uploader
        .put(&target, &file.content_type, file.bytes)
        .await
        .map_err(|e| {
            warn!(storage_key = %target.storage_key, error = %e, "Payload upload failed");
            OrchestratorError::with_source(
                ErrorCode::UploadFailed,
                "Failed to upload file to storage",
                e,
            )
        })?;

    Ok(target.storage_key)
}
