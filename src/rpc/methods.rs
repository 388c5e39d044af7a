//! JSON-RPC method handlers.
//!
//! Implements the handlers for all supported JSON-RPC methods.

use serde::de::DeserializeOwned;
use tracing::info;

use crate::types::AudioFile;

use super::server::ServerState;
use super::types::{
    ConvertVoiceParams, GenerateSoundEffectParams, JsonRpcError, ListResultsResult,
    SelectVoiceParams, SubmitResult,
};

/// Handles a JSON-RPC method call.
pub async fn handle_request(
    method: &str,
    params: serde_json::Value,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    match method {
        "generate_sound_effect" => handle_generate_sound_effect(params, state).await,
        "convert_voice" => handle_convert_voice(params, state).await,
        "select_voice" => handle_select_voice(params, state),
        "cancel" => handle_cancel(state),
        "get_state" => to_value(state.orchestrator.state()),
        "list_results" => to_value(ListResultsResult {
            results: state.registry.list(),
        }),
        "ping" => handle_ping(),
        "shutdown" => handle_shutdown(state),
        _ => Err(JsonRpcError::method_not_found(method)),
    }
}

/// Returns true for methods that wait on the network before responding.
///
/// These are handled off the request loop so `cancel` stays responsive
/// while an upload or submission is in progress.
pub(crate) fn is_long_running(method: &str) -> bool {
    matches!(method, "generate_sound_effect" | "convert_voice")
}

fn parse_params<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

/// Handles the ping method for health checks.
fn handle_ping() -> Result<serde_json::Value, JsonRpcError> {
    Ok(serde_json::json!({ "status": "ok" }))
}

/// Handles the shutdown method.
fn handle_shutdown(state: &ServerState) -> Result<serde_json::Value, JsonRpcError> {
    state.shutdown();
    Ok(serde_json::json!({ "status": "shutting_down" }))
}

/// Handles the cancel method. Reports whether a job was in flight.
fn handle_cancel(state: &ServerState) -> Result<serde_json::Value, JsonRpcError> {
    let cancelled = state.orchestrator.cancel();
    Ok(serde_json::json!({ "cancelled": cancelled }))
}

/// Handles the generate_sound_effect method.
///
/// Responds once the job is accepted; the outcome arrives as a
/// `generation_complete` or `generation_error` notification.
async fn handle_generate_sound_effect(
    params: serde_json::Value,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: GenerateSoundEffectParams = parse_params(params)?;

    let handle = state
        .orchestrator
        .submit_text(&params.text, params.credits)
        .await
        .map_err(|e| JsonRpcError::from(&e))?;

    to_value(SubmitResult {
        job_id: handle.job.id,
        throttled: handle.throttled,
    })
}

/// Handles the convert_voice method.
async fn handle_convert_voice(
    params: serde_json::Value,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: ConvertVoiceParams = parse_params(params)?;

    let file = AudioFile::from_path(&params.path, params.content_type.as_deref())
        .await
        .map_err(|e| {
            JsonRpcError::invalid_params(format!(
                "Cannot read {}: {}",
                params.path.display(),
                e
            ))
        })?;
    let profile = params
        .profile
        .unwrap_or_else(|| state.config.voice_service.clone());

    let handle = state
        .orchestrator
        .submit_file(file, &profile, params.credits)
        .await
        .map_err(|e| JsonRpcError::from(&e))?;

    to_value(SubmitResult {
        job_id: handle.job.id,
        throttled: handle.throttled,
    })
}

/// Handles the select_voice method.
fn handle_select_voice(
    params: serde_json::Value,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: SelectVoiceParams = parse_params(params)?;
    info!(profile = %params.profile, voice_id = %params.voice_id, "Voice selected");
    state.voices.select(params.profile, params.voice_id);
    Ok(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestratorConfig;
    use crate::registry::VoiceResolver;

    fn test_state() -> ServerState {
        ServerState::new(OrchestratorConfig::default()).unwrap()
    }

    #[test]
    fn handle_ping() {
        let value = super::handle_ping().unwrap();
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn handle_unknown_method() {
        let state = test_state();
        let err = handle_request("nonexistent", serde_json::Value::Null, &state)
            .await
            .unwrap_err();
        assert_eq!(err.code, -32601);
    }

    #[tokio::test]
    async fn generate_invalid_params() {
        let state = test_state();
        let err = handle_request("generate_sound_effect", serde_json::json!({}), &state)
            .await
            .unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[tokio::test]
    async fn generate_blank_text_fails_before_network() {
        let state = test_state();
        let params = serde_json::json!({ "text": "  ", "credits": 100 });
        let err = handle_request("generate_sound_effect", params, &state)
            .await
            .unwrap_err();
        assert_eq!(err.code, -32001);
        assert_eq!(err.data.unwrap().error_code, "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn generate_low_balance() {
        let state = test_state();
        let params = serde_json::json!({ "text": "Door creak", "credits": 3 });
        let err = handle_request("generate_sound_effect", params, &state)
            .await
            .unwrap_err();
        assert_eq!(err.data.unwrap().error_code, "INSUFFICIENT_BALANCE");
    }

    #[tokio::test]
    async fn convert_missing_file_is_invalid_params() {
        let state = test_state();
        let params = serde_json::json!({ "path": "/nonexistent/voice.wav", "credits": 100 });
        let err = handle_request("convert_voice", params, &state)
            .await
            .unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[tokio::test]
    async fn convert_rejects_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.ogg");
        std::fs::write(&path, b"OggS").unwrap();

        let state = test_state();
        let params = serde_json::json!({ "path": path, "credits": 100 });
        let err = handle_request("convert_voice", params, &state)
            .await
            .unwrap_err();
        assert_eq!(err.data.unwrap().error_code, "UNSUPPORTED_MEDIA_TYPE");
    }

    #[tokio::test]
    async fn get_state_starts_idle() {
        let state = test_state();
        let value = handle_request("get_state", serde_json::Value::Null, &state)
            .await
            .unwrap();
        assert_eq!(value["state"], "idle");
    }

    #[tokio::test]
    async fn list_results_empty() {
        let state = test_state();
        let value = handle_request("list_results", serde_json::Value::Null, &state)
            .await
            .unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn cancel_when_idle() {
        let state = test_state();
        let value = handle_request("cancel", serde_json::Value::Null, &state)
            .await
            .unwrap();
        assert_eq!(value["cancelled"], false);
    }

    #[tokio::test]
    async fn select_voice_updates_catalog() {
        let state = test_state();
        let params = serde_json::json!({ "profile": "seedvc", "voice_id": "woman" });
        handle_request("select_voice", params, &state).await.unwrap();
        assert_eq!(state.voices.resolve_voice("seedvc").as_deref(), Some("woman"));
    }

    #[tokio::test]
    async fn handle_shutdown() {
        let state = test_state();
        super::handle_shutdown(&state).unwrap();
        assert!(state.is_shutdown());
    }
}
