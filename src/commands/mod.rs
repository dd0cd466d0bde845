/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `solve`   — Capture a frame and solve the problem it shows
- `ask`     — Ask a text follow-up about the current session
- `chat`    — Interactive readline session
- `history` — Show or clear the persisted session

These handlers are intentionally small and use the library components:
providers, the gateway, and the assistant.
*/

use crate::assistant::Assistant;
use crate::capture::{
    CameraCapture, CaptureConstraints, CommandFrameSource, FacingMode, FileFrameSource,
    FrameSource,
};
use crate::config::Config;
use crate::error::{LenstutorError, Result};
use crate::gateway::InferenceGateway;
use crate::providers::create_provider;
use crate::session::SessionStore;
use crate::speech::{CommandEngine, SpeechController};
use std::path::PathBuf;
use std::sync::Arc;

pub mod ask;
pub mod chat;
pub mod history;
pub mod solve;

/// Build the assistant from configuration
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `image_override` - When set, frames come from this file instead of
///   the camera grabber command
/// * `speak_requested` - A `--speak` flag was passed for this
///   invocation; wins over `speech.enabled: false` in config
///
/// # Errors
///
/// Returns error if the provider cannot be created or the session store
/// path cannot be prepared
pub fn build_assistant(
    config: &Config,
    image_override: Option<PathBuf>,
    speak_requested: bool,
) -> Result<Assistant> {
    let provider = create_provider(&config.provider.provider_type, &config.provider)?;

    let store = Arc::new(match &config.session.file {
        Some(path) => SessionStore::new_with_path(path.clone())?,
        None => SessionStore::new()?,
    });

    let gateway = InferenceGateway::new(provider, store, config.session.context_turns);

    let speech = if config.speech.enabled || speak_requested {
        Some(SpeechController::new(
            Arc::new(CommandEngine::new(config.speech.command.clone())),
            config.speech.rate,
            config.speech.pitch,
        ))
    } else {
        None
    };

    let facing = FacingMode::parse_str(&config.capture.facing).map_err(LenstutorError::Config)?;
    let constraints = CaptureConstraints {
        width: config.capture.width,
        height: config.capture.height,
        quality: config.capture.quality,
        facing,
    };

    let source: Box<dyn FrameSource> = match image_override {
        Some(path) => Box::new(FileFrameSource::new(path)),
        None => Box::new(CommandFrameSource::new(config.capture.command.clone())),
    };
    let capture = CameraCapture::new(source, constraints);

    Ok(Assistant::new(gateway, speech, capture))
}
