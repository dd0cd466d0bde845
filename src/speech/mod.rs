//! Speech synthesis control
//!
//! Converts a result string to audible speech while enforcing at most
//! one utterance in flight at a time. Starting a new utterance always
//! supersedes any prior one; the superseded utterance's completion
//! callback still fires exactly once, reporting cancellation.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub mod command;

pub use command::CommandEngine;

/// How an utterance ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceOutcome {
    /// Playback ran to natural completion
    Completed,
    /// Playback was cancelled by a newer utterance or an explicit stop
    Cancelled,
    /// The synthesizer failed to play the utterance
    Failed,
}

/// Handle to one in-flight utterance
#[async_trait]
pub trait UtteranceHandle: Send {
    /// Wait for the utterance to finish
    async fn wait(&mut self) -> UtteranceOutcome;

    /// Cancel playback immediately
    async fn cancel(&mut self);
}

/// Platform speech synthesis seam
///
/// Production code uses [`CommandEngine`]; tests substitute a fake
/// engine with controllable completion.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Start speaking `text` at the given rate and pitch
    async fn start(&self, text: &str, rate: f32, pitch: f32) -> Result<Box<dyn UtteranceHandle>>;
}

/// Completion callback invoked exactly once per utterance
pub type DoneCallback = Box<dyn FnOnce(UtteranceOutcome) + Send>;

struct ActiveUtterance {
    generation: u64,
    cancel: oneshot::Sender<()>,
}

/// Two-state controller (Idle / Speaking) over a speech engine
///
/// The cancel-then-start sequence on [`speak`] is the concurrency
/// discipline that prevents overlapping audio: at most one utterance is
/// ever active.
///
/// [`speak`]: SpeechController::speak
pub struct SpeechController {
    engine: Arc<dyn SpeechEngine>,
    rate: f32,
    pitch: f32,
    current: Arc<Mutex<Option<ActiveUtterance>>>,
    generation: AtomicU64,
}

impl SpeechController {
    /// Create a controller over the given engine
    ///
    /// # Arguments
    ///
    /// * `engine` - Speech synthesis backend
    /// * `rate` - Speaking rate, 1.0 = synthesizer default
    /// * `pitch` - Voice pitch, 1.0 = synthesizer default
    pub fn new(engine: Arc<dyn SpeechEngine>, rate: f32, pitch: f32) -> Self {
        Self {
            engine,
            rate,
            pitch,
            current: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        }
    }

    /// Whether an utterance is currently in flight
    pub fn is_speaking(&self) -> bool {
        self.current
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Speak `text`, superseding any in-flight utterance
    ///
    /// Any active utterance is cancelled first (its callback fires with
    /// [`UtteranceOutcome::Cancelled`]), then a new one is started.
    /// `on_done` fires exactly once: with `Completed` on natural
    /// completion, `Cancelled` when superseded or stopped, or `Failed`
    /// when the engine cannot start or play the utterance.
    pub async fn speak(&self, text: &str, on_done: DoneCallback) {
        self.stop();

        let mut handle = match self.engine.start(text, self.rate, self.pitch).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Failed to start utterance: {:#}", e);
                on_done(UtteranceOutcome::Failed);
                return;
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (cancel_tx, mut cancel_rx) = oneshot::channel();

        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(ActiveUtterance {
                generation,
                cancel: cancel_tx,
            });
        }

        let current = Arc::clone(&self.current);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                outcome = handle.wait() => outcome,
                _ = &mut cancel_rx => {
                    handle.cancel().await;
                    UtteranceOutcome::Cancelled
                }
            };

            // Only clear the slot if a newer utterance hasn't replaced it.
            if let Ok(mut slot) = current.lock() {
                if slot.as_ref().map(|active| active.generation) == Some(generation) {
                    *slot = None;
                }
            }

            on_done(outcome);
        });
    }

    /// Cancel the in-flight utterance, if any
    ///
    /// Idempotent when already idle.
    pub fn stop(&self) {
        if let Ok(mut slot) = self.current.lock() {
            if let Some(active) = slot.take() {
                let _ = active.cancel.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Fake engine whose utterances complete only when the test fires them
    struct FakeEngine {
        controls: Mutex<VecDeque<oneshot::Sender<()>>>,
    }

    impl FakeEngine {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                controls: Mutex::new(VecDeque::new()),
            })
        }

        /// Let the oldest still-pending utterance complete naturally
        fn finish_next(&self) {
            let sender = self.controls.lock().unwrap().pop_front().expect("utterance");
            let _ = sender.send(());
        }
    }

    struct FakeHandle {
        done: Option<oneshot::Receiver<()>>,
    }

    #[async_trait]
    impl UtteranceHandle for FakeHandle {
        async fn wait(&mut self) -> UtteranceOutcome {
            match self.done.take().expect("wait called once").await {
                Ok(()) => UtteranceOutcome::Completed,
                Err(_) => UtteranceOutcome::Failed,
            }
        }

        async fn cancel(&mut self) {
            self.done.take();
        }
    }

    #[async_trait]
    impl SpeechEngine for FakeEngine {
        async fn start(
            &self,
            _text: &str,
            _rate: f32,
            _pitch: f32,
        ) -> Result<Box<dyn UtteranceHandle>> {
            let (tx, rx) = oneshot::channel();
            self.controls.lock().unwrap().push_back(tx);
            Ok(Box::new(FakeHandle { done: Some(rx) }))
        }
    }

    /// Failing engine for the start-error path
    struct BrokenEngine;

    #[async_trait]
    impl SpeechEngine for BrokenEngine {
        async fn start(
            &self,
            _text: &str,
            _rate: f32,
            _pitch: f32,
        ) -> Result<Box<dyn UtteranceHandle>> {
            Err(crate::error::LenstutorError::Speech("no synthesizer".to_string()).into())
        }
    }

    fn outcome_channel() -> (DoneCallback, oneshot::Receiver<UtteranceOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
            rx,
        )
    }

    async fn recv(rx: oneshot::Receiver<UtteranceOutcome>) -> UtteranceOutcome {
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .expect("callback fired within timeout")
            .expect("callback fired")
    }

    #[tokio::test]
    async fn test_speak_reports_natural_completion() {
        let engine = FakeEngine::new();
        let controller = SpeechController::new(engine.clone(), 0.9, 1.0);

        let (on_done, rx) = outcome_channel();
        controller.speak("hello", on_done).await;
        assert!(controller.is_speaking());

        engine.finish_next();
        assert_eq!(recv(rx).await, UtteranceOutcome::Completed);
        assert!(!controller.is_speaking());
    }

    #[tokio::test]
    async fn test_second_speak_cancels_first() {
        let engine = FakeEngine::new();
        let controller = SpeechController::new(engine.clone(), 0.9, 1.0);

        let (on_done_first, rx_first) = outcome_channel();
        controller.speak("hello", on_done_first).await;

        let (on_done_second, rx_second) = outcome_channel();
        controller.speak("hello again", on_done_second).await;

        // First callback fires exactly once, reporting cancellation.
        assert_eq!(recv(rx_first).await, UtteranceOutcome::Cancelled);
        assert!(controller.is_speaking());

        // Only the second utterance observes natural completion.
        engine.finish_next();
        assert_eq!(recv(rx_second).await, UtteranceOutcome::Completed);
        assert!(!controller.is_speaking());
    }

    #[tokio::test]
    async fn test_stop_cancels_in_flight_utterance() {
        let engine = FakeEngine::new();
        let controller = SpeechController::new(engine.clone(), 0.9, 1.0);

        let (on_done, rx) = outcome_channel();
        controller.speak("hello", on_done).await;
        controller.stop();

        assert_eq!(recv(rx).await, UtteranceOutcome::Cancelled);
        assert!(!controller.is_speaking());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_when_idle() {
        let engine = FakeEngine::new();
        let controller = SpeechController::new(engine, 0.9, 1.0);

        controller.stop();
        controller.stop();
        assert!(!controller.is_speaking());
    }

    #[tokio::test]
    async fn test_start_failure_fires_callback_with_failed() {
        let controller = SpeechController::new(Arc::new(BrokenEngine), 0.9, 1.0);

        let (on_done, rx) = outcome_channel();
        controller.speak("hello", on_done).await;

        assert_eq!(recv(rx).await, UtteranceOutcome::Failed);
        assert!(!controller.is_speaking());
    }
}
