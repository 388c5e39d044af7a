//! JSON-RPC server over stdin/stdout.
//!
//! Implements the JSON-RPC 2.0 protocol for daemon communication. Requests
//! are read one line at a time. Submissions run in their own tasks so the
//! loop keeps reading (and can act on `cancel`) while they wait on the
//! network; notifications from running jobs are written from their tasks.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::config::OrchestratorConfig;
use crate::generation::{GenerationOrchestrator, Notification, Notifier, OrchestratorState};
use crate::registry::{PlaybackRegistry, StaticVoiceCatalog, TrackRegistry};
use crate::service::{HttpGenerationService, ServiceError};
use crate::types::PlayableResult;

use super::methods::{handle_request, is_long_running};
use super::types::{
    GenerationErrorParams, JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, ThrottleNoticeParams,
};

/// State shared across all request handlers.
pub struct ServerState {
    /// Orchestrator driving the daemon's single surface.
    pub orchestrator: GenerationOrchestrator,
    /// Finished results.
    pub registry: Arc<TrackRegistry>,
    /// Voice selection per profile.
    pub voices: Arc<StaticVoiceCatalog>,
    /// Daemon configuration.
    pub config: OrchestratorConfig,
    /// Flag to signal server shutdown.
    shutdown: Arc<AtomicBool>,
}

impl ServerState {
    /// Creates server state talking to the HTTP service in `config`.
    pub fn new(config: OrchestratorConfig) -> Result<Self, ServiceError> {
        let service = Arc::new(HttpGenerationService::from_config(&config)?);
        let registry = Arc::new(TrackRegistry::with_capacity(config.registry_capacity));
        let voices = Arc::new(StaticVoiceCatalog::new(config.voices.clone()));

        let orchestrator = GenerationOrchestrator::new(
            service.clone(),
            service,
            Arc::new(RpcRegistry(registry.clone())),
            Arc::new(RpcNotifier),
            voices.clone(),
            &config,
        );

        Ok(Self {
            orchestrator,
            registry,
            voices,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Signals the server to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

/// Playback registry that announces each published result.
struct RpcRegistry(Arc<TrackRegistry>);

impl PlaybackRegistry for RpcRegistry {
    fn publish(&self, result: PlayableResult) {
        send_notification("generation_complete", &result);
        self.0.publish(result);
    }
}

/// Notifier that forwards notifications to the client.
struct RpcNotifier;

impl Notifier for RpcNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::ThrottleNotice { job_id, message } => {
                send_notification("throttle_notice", ThrottleNoticeParams { job_id, message });
            }
            Notification::Failure {
                job_id,
                code,
                message,
                ..
            } => {
                send_notification(
                    "generation_error",
                    GenerationErrorParams {
                        job_id,
                        code: code.as_str().to_string(),
                        message,
                    },
                );
            }
        }
    }
}

/// Runs the JSON-RPC server, reading from stdin and writing to stdout.
///
/// Returns when stdin closes or a `shutdown` request is handled. Any job
/// still polling is cancelled when the state is dropped.
pub async fn run_server(state: ServerState) {
    let state = Arc::new(state);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let watcher = tokio::spawn(forward_state_changes(state.orchestrator.subscribe()));

    info!("JSON-RPC server started, waiting for requests");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "Error reading stdin");
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let request = match parse_request(&line) {
            Ok(request) => request,
            Err(response) => {
                write_line(&response);
                continue;
            }
        };

        if is_long_running(&request.method) {
            let state = state.clone();
            tokio::spawn(async move {
                write_line(&respond(request, &state).await);
            });
        } else {
            write_line(&respond(request, &state).await);
        }

        if state.is_shutdown() {
            info!("Server shutdown requested");
            break;
        }
    }

    watcher.abort();
    info!("JSON-RPC server stopped");
}

/// Emits a `state_changed` notification for every state transition.
async fn forward_state_changes(mut rx: watch::Receiver<OrchestratorState>) {
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        debug!(?state, "State changed");
        send_notification("state_changed", state);
    }
}

/// Processes a single JSON-RPC request line.
pub(crate) async fn process_request(line: &str, state: &ServerState) -> Option<String> {
    match parse_request(line) {
        Ok(request) => Some(respond(request, state).await),
        Err(response) => Some(response),
    }
}

/// Parses and checks a request line. On failure returns the error response.
fn parse_request(line: &str) -> Result<JsonRpcRequest, String> {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                None,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            );
            return Err(serde_json::to_string(&error).unwrap_or_default());
        }
    };

    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        let error = JsonRpcErrorResponse::new(
            Some(request.id),
            JsonRpcError::invalid_request("Invalid JSON-RPC version (expected 2.0)"),
        );
        return Err(serde_json::to_string(&error).unwrap_or_default());
    }

    Ok(request)
}

/// Dispatches a parsed request and serializes the response.
async fn respond(request: JsonRpcRequest, state: &ServerState) -> String {
    match handle_request(&request.method, request.params, state).await {
        Ok(result) => {
            serde_json::to_string(&JsonRpcResponse::new(request.id, result)).unwrap_or_default()
        }
        Err(error) => serde_json::to_string(&JsonRpcErrorResponse::new(Some(request.id), error))
            .unwrap_or_default(),
    }
}

/// Sends a JSON-RPC notification to stdout.
pub fn send_notification<T: serde::Serialize>(method: &'static str, params: T) {
    let notification = JsonRpcNotification::new(method, params);
    if let Ok(json) = serde_json::to_string(&notification) {
        write_line(&json);
    }
}

fn write_line(line: &str) {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", line).ok();
    stdout.flush().ok();
}
