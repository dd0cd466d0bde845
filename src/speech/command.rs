//! Subprocess-backed speech engine
//!
//! Shells out to the platform speech synthesizer: `say` on macOS,
//! `espeak` elsewhere. The command can be overridden through
//! configuration for systems with a different synthesizer installed.

use crate::error::{LenstutorError, Result};
use crate::speech::{SpeechEngine, UtteranceHandle, UtteranceOutcome};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Words-per-minute both `say` and `espeak` treat as their default rate
const BASE_WPM: f32 = 175.0;

/// espeak's neutral pitch value (range 0-99)
const BASE_PITCH: f32 = 50.0;

/// Speech engine that spawns one synthesizer process per utterance
pub struct CommandEngine {
    program: String,
}

impl CommandEngine {
    /// Create an engine using the platform default synthesizer
    pub fn new(command_override: Option<String>) -> Self {
        let program = command_override.unwrap_or_else(|| {
            if cfg!(target_os = "macos") {
                "say".to_string()
            } else {
                "espeak".to_string()
            }
        });
        Self { program }
    }

    fn build_command(&self, text: &str, rate: f32, pitch: f32) -> Command {
        let mut cmd = Command::new(&self.program);

        let wpm = (rate * BASE_WPM).round() as i64;
        if self.program.ends_with("say") {
            // `say` has no pitch flag.
            cmd.arg("-r").arg(wpm.to_string());
        } else {
            cmd.arg("-s").arg(wpm.to_string());
            cmd.arg("-p").arg(((pitch * BASE_PITCH).round() as i64).to_string());
        }

        cmd.arg(text);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl SpeechEngine for CommandEngine {
    async fn start(&self, text: &str, rate: f32, pitch: f32) -> Result<Box<dyn UtteranceHandle>> {
        let child = self
            .build_command(text, rate, pitch)
            .spawn()
            .map_err(|e| {
                LenstutorError::Speech(format!("Failed to run {}: {}", self.program, e))
            })?;

        tracing::debug!("Started utterance via {} ({} chars)", self.program, text.len());
        Ok(Box::new(ChildUtterance { child }))
    }
}

/// Handle over one synthesizer child process
struct ChildUtterance {
    child: Child,
}

#[async_trait]
impl UtteranceHandle for ChildUtterance {
    async fn wait(&mut self) -> UtteranceOutcome {
        match self.child.wait().await {
            Ok(status) if status.success() => UtteranceOutcome::Completed,
            Ok(_) => UtteranceOutcome::Failed,
            Err(e) => {
                tracing::warn!("Failed to wait for synthesizer: {}", e);
                UtteranceOutcome::Failed
            }
        }
    }

    async fn cancel(&mut self) {
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }
}
