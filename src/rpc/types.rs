//! JSON-RPC types for the daemon protocol.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, OrchestratorError};
use crate::types::PlayableResult;

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Integer(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Integer(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::String(id)
    }
}

/// A JSON-RPC request wrapper.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub id: RequestId,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC response wrapper.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    pub result: T,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(id: RequestId, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// A JSON-RPC error response.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RequestId>,
    pub error: JsonRpcError,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonRpcErrorData>,
}

/// Extended error data for application-specific errors.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorData {
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl JsonRpcError {
    /// Creates a parse error (-32700).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an invalid request error (-32600).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a method not found error (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
            data: None,
        }
    }

    /// Creates an invalid params error (-32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an internal error (-32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }
}

/// Application error code for an orchestrator error, in the -32000 range.
pub fn rpc_error_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InsufficientBalance => -32000,
        ErrorCode::EmptyInput => -32001,
        ErrorCode::UnsupportedMediaType => -32002,
        ErrorCode::PayloadTooLarge => -32003,
        ErrorCode::UploadFailed => -32004,
        ErrorCode::SubmissionFailed => -32005,
        ErrorCode::PollingFailed => -32006,
        ErrorCode::GenericFailure => -32007,
        ErrorCode::JobInFlight => -32008,
        ErrorCode::VoiceUnavailable => -32009,
    }
}

impl From<&OrchestratorError> for JsonRpcError {
    fn from(err: &OrchestratorError) -> Self {
        Self {
            code: rpc_error_code(err.code),
            message: err.code.description().to_string(),
            data: Some(JsonRpcErrorData {
                error_code: err.code.as_str().to_string(),
                details: Some(err.message.clone()),
            }),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Parameters for `generate_sound_effect`.
#[derive(Debug, Deserialize)]
pub struct GenerateSoundEffectParams {
    /// Description of the sound; truncated to the prompt limit.
    pub text: String,

    /// Caller's current credit balance.
    pub credits: u32,
}

/// Parameters for `convert_voice`.
#[derive(Debug, Deserialize)]
pub struct ConvertVoiceParams {
    /// Audio file to convert.
    pub path: PathBuf,

    /// Declared MIME type; inferred from the extension when omitted.
    pub content_type: Option<String>,

    /// Voice profile to resolve the target voice from; defaults to the
    /// configured voice service.
    pub profile: Option<String>,

    /// Caller's current credit balance.
    pub credits: u32,
}

/// Parameters for `select_voice`.
#[derive(Debug, Deserialize)]
pub struct SelectVoiceParams {
    pub profile: String,
    pub voice_id: String,
}

/// Response for an accepted submission.
#[derive(Debug, Serialize)]
pub struct SubmitResult {
    /// Job identifier assigned by the service.
    pub job_id: String,

    /// Whether the service reported throttling.
    pub throttled: bool,
}

/// Response for `list_results`, newest first.
#[derive(Debug, Serialize)]
pub struct ListResultsResult {
    pub results: Vec<PlayableResult>,
}

// ============================================================================
// Notifications
// ============================================================================

/// A JSON-RPC notification (no id field).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<T: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
}

impl<T: Serialize> JsonRpcNotification<T> {
    pub fn new(method: &'static str, params: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

/// Notification sent when the service reports throttling.
#[derive(Debug, Serialize)]
pub struct ThrottleNoticeParams {
    pub job_id: String,
    pub message: String,
}

/// Notification sent when a submission or job fails.
#[derive(Debug, Serialize)]
pub struct GenerationErrorParams {
    /// Job that failed; absent when no job was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    /// Error code.
    pub code: String,

    /// User-facing message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_from_int() {
        let id: RequestId = 42.into();
        assert_eq!(id, RequestId::Integer(42));
    }

    #[test]
    fn request_id_from_string() {
        let id: RequestId = "abc".to_string().into();
        assert_eq!(id, RequestId::String("abc".to_string()));
    }

    #[test]
    fn json_rpc_error_codes() {
        assert_eq!(JsonRpcError::parse_error("").code, -32700);
        assert_eq!(JsonRpcError::invalid_request("").code, -32600);
        assert_eq!(JsonRpcError::method_not_found("").code, -32601);
        assert_eq!(JsonRpcError::invalid_params("").code, -32602);
        assert_eq!(JsonRpcError::internal_error("").code, -32603);
    }

    #[test]
    fn orchestrator_error_maps_to_application_range() {
        let err = OrchestratorError::payload_too_large(60, 50);
        let rpc = JsonRpcError::from(&err);
        assert_eq!(rpc.code, -32003);
        let data = rpc.data.unwrap();
        assert_eq!(data.error_code, "PAYLOAD_TOO_LARGE");
        assert!(data.details.unwrap().contains("60"));
    }

    #[test]
    fn convert_voice_params_optional_fields() {
        let params: ConvertVoiceParams =
            serde_json::from_value(serde_json::json!({ "path": "/tmp/a.wav", "credits": 20 }))
                .unwrap();
        assert!(params.content_type.is_none());
        assert!(params.profile.is_none());
        assert_eq!(params.credits, 20);
    }

    #[test]
    fn error_params_omit_missing_job() {
        let params = GenerationErrorParams {
            job_id: None,
            code: "EMPTY_INPUT".to_string(),
            message: "m".to_string(),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("job_id").is_none());
    }
}
