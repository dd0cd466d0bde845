//! Assistant orchestration
//!
//! Ties capture, inference and speech together behind a single busy
//! flag: while one request is in flight, further submissions are
//! rejected instead of queued. Capture and admission failures surface
//! as errors; provider failures are already normalized to user-facing
//! strings by the gateway.

use crate::capture::{CameraCapture, FacingMode};
use crate::error::{LenstutorError, Result};
use crate::gateway::{InferenceGateway, PromptMode};
use crate::session::ChatMessage;
use crate::speech::{SpeechController, UtteranceOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Camera-first teaching assistant
///
/// One instance serves the whole process. All entry points are
/// admission-controlled: at most one solve or ask runs at a time.
pub struct Assistant {
    gateway: InferenceGateway,
    speech: Option<SpeechController>,
    capture: Mutex<CameraCapture>,
    busy: AtomicBool,
}

/// Resets the busy flag when a request finishes, even on early return
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl Assistant {
    /// Create a new assistant
    ///
    /// # Arguments
    ///
    /// * `gateway` - Inference gateway owning the provider and session store
    /// * `speech` - Speech controller, or `None` when speech is disabled
    /// * `capture` - Camera capture used by [`solve`]
    ///
    /// [`solve`]: Assistant::solve
    pub fn new(
        gateway: InferenceGateway,
        speech: Option<SpeechController>,
        capture: CameraCapture,
    ) -> Self {
        Self {
            gateway,
            speech,
            capture: Mutex::new(capture),
            busy: AtomicBool::new(false),
        }
    }

    /// Whether a request is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Whether a speech controller is available
    pub fn has_speech(&self) -> bool {
        self.speech.is_some()
    }

    /// Acquire the busy flag or reject the submission
    fn begin(&self) -> Result<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| LenstutorError::Busy)?;
        Ok(BusyGuard { busy: &self.busy })
    }

    /// Capture a frame and solve the problem it shows
    ///
    /// Captures one screenshot, sends it through the gateway with the
    /// selected explanation mode, and optionally speaks the answer.
    ///
    /// # Errors
    ///
    /// Returns [`LenstutorError::Busy`] while another request is in
    /// flight, or a capture error when no frame is available. Provider
    /// failures do not error; they come back as the normalized answer
    /// string.
    pub async fn solve(&self, mode: PromptMode, speak: bool) -> Result<String> {
        let _guard = self.begin()?;

        let screenshot = {
            let mut capture = self
                .capture
                .lock()
                .map_err(|_| LenstutorError::Capture("camera lock poisoned".to_string()))?;
            capture.screenshot()?
        };

        let answer = self.gateway.analyze_image(&screenshot, mode).await;
        if speak {
            self.speak(&answer).await;
        }
        Ok(answer)
    }

    /// Answer a text follow-up query
    ///
    /// # Errors
    ///
    /// Returns [`LenstutorError::Busy`] while another request is in
    /// flight.
    pub async fn ask(&self, query: &str, speak: bool) -> Result<String> {
        let _guard = self.begin()?;

        let answer = self.gateway.analyze_prompt(query).await;
        if speak {
            self.speak(&answer).await;
        }
        Ok(answer)
    }

    /// Switch between front and back camera; returns the new facing
    pub fn toggle_camera(&self) -> Result<FacingMode> {
        let mut capture = self
            .capture
            .lock()
            .map_err(|_| LenstutorError::Capture("camera lock poisoned".to_string()))?;
        Ok(capture.toggle_facing())
    }

    /// Cancel any in-flight speech
    pub fn stop_speaking(&self) {
        if let Some(speech) = &self.speech {
            speech.stop();
        }
    }

    /// Full session history, oldest first
    pub fn history(&self) -> Vec<ChatMessage> {
        self.gateway.store().history()
    }

    /// Clear the session
    pub fn clear_history(&self) -> Result<()> {
        self.gateway.store().clear()
    }

    async fn speak(&self, text: &str) {
        if let Some(speech) = &self.speech {
            speech
                .speak(
                    text,
                    Box::new(|outcome| {
                        if outcome == UtteranceOutcome::Failed {
                            tracing::warn!("Speech synthesis failed");
                        }
                    }),
                )
                .await;
        }
    }
}
