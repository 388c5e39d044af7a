//! soundgen-daemon: orchestrates remote sound effect and voice conversion jobs.
//!
//! A submission is validated locally, uploaded to pre-signed storage when it
//! carries an audio file, submitted to the generation service, and polled
//! until it finishes. Finished audio is published to a playback registry;
//! failures become a single user-facing notification.
//!
//! # Modules
//!
//! - [`types`]: Core data types (Job, Submission, PlayableResult)
//! - [`config`]: Runtime configuration (OrchestratorConfig)
//! - [`error`]: Error types and codes (OrchestratorError, ErrorCode)
//! - [`service`]: Generation service and upload traits, HTTP implementation
//! - [`registry`]: Playback registry and voice selection
//! - [`generation`]: Validator, upload, submitter, poller, handoff, orchestrator
//! - [`rpc`]: JSON-RPC server for daemon mode
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use soundgen_daemon::{
//!     GenerationOrchestrator, HttpGenerationService, LogNotifier, OrchestratorConfig,
//!     StaticVoiceCatalog, TrackRegistry,
//! };
//!
//! let config = OrchestratorConfig::from_env();
//! let service = Arc::new(HttpGenerationService::from_config(&config)?);
//! let registry = Arc::new(TrackRegistry::new());
//! let orchestrator = GenerationOrchestrator::new(
//!     service.clone(),
//!     service,
//!     registry.clone(),
//!     Arc::new(LogNotifier),
//!     Arc::new(StaticVoiceCatalog::new(config.voices.clone())),
//!     &config,
//! );
//!
//! let handle = orchestrator.submit_text("Thunder rolling over hills", 40).await?;
//! let outcome = handle.wait().await?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod registry;
pub mod rpc;
pub mod service;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::OrchestratorConfig;
pub use error::{ErrorCode, OrchestratorError, Result};
pub use generation::{
    GenerationOrchestrator, JobHandle, JobOutcome, LogNotifier, Notification, Notifier,
    OrchestratorState, PreconditionValidator,
};
pub use registry::{PlaybackRegistry, StaticVoiceCatalog, TrackRegistry, VoiceResolver};
pub use service::{GenerationService, HttpGenerationService, PayloadUploader, ServiceError};
pub use types::{AudioFile, Job, JobKind, JobStatus, PlayableResult, Submission, TextPrompt};
