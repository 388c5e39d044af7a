//! JSON-RPC module for daemon communication.
//!
//! Provides the JSON-RPC 2.0 server implementation for:
//! - `generate_sound_effect`: Submit a text-to-sound-effect job
//! - `convert_voice`: Upload an audio file and submit a voice conversion
//! - `select_voice`: Choose the voice for a voice profile
//! - `cancel`: Cancel the job in flight
//! - `get_state`: Current orchestrator state
//! - `list_results`: Finished results, newest first
//! - `ping`: Health check
//! - `shutdown`: Graceful shutdown
//!
//! Notifications:
//! - `state_changed`: Orchestrator state transitions
//! - `throttle_notice`: The service is queueing requests
//! - `generation_complete`: A result was published
//! - `generation_error`: A submission or job failed

pub mod methods;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use server::{run_server, send_notification, ServerState};
pub use types::{
    ConvertVoiceParams, GenerateSoundEffectParams, GenerationErrorParams, JsonRpcError,
    JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
    SubmitResult, ThrottleNoticeParams,
};
