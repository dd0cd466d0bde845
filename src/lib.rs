//! Lenstutor - Camera-first AI teaching assistant
//!
//! Point the camera at an academic problem, choose an explanation
//! style, and get a spoken or written answer. Follow-up questions are
//! answered over a rolling, size-bounded session context that survives
//! process restarts.
//!
//! The crate is organized around a few seams:
//!
//! - [`session`] - persistent, bounded conversation log with change
//!   notifications
//! - [`providers`] - inference provider abstraction (Gemini, Ollama)
//! - [`gateway`] - request composition, image validation, and turn
//!   persistence
//! - [`capture`] - camera frame capture producing JPEG data URLs
//! - [`speech`] - one-utterance-at-a-time speech synthesis control
//! - [`assistant`] - orchestration with single-request admission control
//! - [`commands`] - CLI command handlers

pub mod assistant;
pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod session;
pub mod speech;

#[cfg(test)]
pub mod test_utils;

pub use assistant::Assistant;
pub use config::Config;
pub use error::{LenstutorError, Result};
pub use gateway::{InferenceGateway, PromptMode};
pub use session::SessionStore;
