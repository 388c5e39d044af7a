//! Core types for the generation orchestrator.
//!
//! This module re-exports all the core data types used throughout the crate:
//! - [`TextPrompt`] and [`AudioFile`]: captured user input
//! - [`Submission`] and [`GenerationRequest`]: what is validated and what is sent
//! - [`Job`] and [`JobStatus`]: a remote job and its observed status
//! - [`PlayableResult`]: a finished artifact handed to the playback registry

mod job;
mod request;
mod result;

// Re-export all types at the module level
pub use job::{Job, JobKind, JobStatus, JobTicket};
pub use request::{
    infer_content_type, AudioFile, GenerationRequest, Submission, TextPrompt,
    ALLOWED_AUDIO_TYPES, MAX_PROMPT_CHARS,
};
pub use result::{text_title, PlayableResult, DURATION_PLACEHOLDER, FILE_TITLE_FALLBACK};
