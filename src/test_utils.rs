//! Shared test utilities
//!
//! Provides a recording stub provider used by gateway and assistant
//! tests to observe call counts and composed requests without touching
//! the network.

use crate::error::{LenstutorError, Result};
use crate::providers::{InferenceRequest, Provider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Stub provider that records every request it receives
///
/// Can be configured to succeed with a fixed response, fail with a
/// fixed error, or block until released (to exercise busy-flag
/// admission control).
pub struct RecordingProvider {
    response: std::result::Result<String, String>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
    gate: Option<Arc<Notify>>,
}

impl RecordingProvider {
    /// Provider that always succeeds with `response`
    pub fn returning(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Provider that always fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Provider that succeeds with `response` only after `gate` is notified
    pub fn gated(response: impl Into<String>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::returning(response)
        }
    }

    /// Shared call counter
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Shared log of received requests
    pub fn requests(&self) -> Arc<Mutex<Vec<InferenceRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(LenstutorError::Provider(message.clone()).into()),
        }
    }
}
