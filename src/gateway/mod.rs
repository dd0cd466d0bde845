//! Inference gateway
//!
//! Wraps calls to the external generative-AI provider for two request
//! shapes: image-grounded analysis and pure-text follow-up. Both entry
//! points share the same lifecycle: build context from the session,
//! call the provider once, persist the turn pair on success, and
//! normalize every failure into a user-facing string at the boundary.

use crate::error::Result;
use crate::providers::{InferenceRequest, Provider};
use crate::session::{build_context, ChatMessage, ContextTarget, SessionStore};
use std::sync::Arc;

pub mod image;
pub mod prompt;

pub use image::{validate_image, MAX_IMAGE_BYTES};
pub use prompt::{instruction_for, PromptMode};

use prompt::PLAIN_TEXT_DIRECTIVE;

/// Placeholder content persisted for capture-originated user turns
pub const IMAGE_TURN_PLACEHOLDER: &str = "Image submitted for analysis";

/// Gateway to the external inference provider
///
/// Owns the provider and a handle to the session store. Failed calls
/// never mutate the store, so failed turns are never persisted.
pub struct InferenceGateway {
    provider: Box<dyn Provider>,
    store: Arc<SessionStore>,
    max_context_turns: usize,
}

impl InferenceGateway {
    /// Create a new gateway
    ///
    /// # Arguments
    ///
    /// * `provider` - The inference provider to delegate to
    /// * `store` - Session store for history and turn persistence
    /// * `max_context_turns` - Number of prior messages threaded into requests
    pub fn new(
        provider: Box<dyn Provider>,
        store: Arc<SessionStore>,
        max_context_turns: usize,
    ) -> Self {
        Self {
            provider,
            store,
            max_context_turns,
        }
    }

    /// The session store backing this gateway
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Analyze a captured image
    ///
    /// Validates the image locally, threads the bounded context window
    /// into a mode-specific instruction, and sends one provider call.
    /// On success the user/assistant turn pair is persisted and the
    /// response text returned; on any failure a user-facing error string
    /// is returned and the session is left unmodified.
    pub async fn analyze_image(&self, image_data: &str, mode: PromptMode) -> String {
        match self.try_analyze_image(image_data, mode).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Image analysis failed: {:#}", e);
                format!("Sorry, I encountered an error: {}. Please try again.", e)
            }
        }
    }

    /// Answer a text follow-up query
    ///
    /// Same lifecycle as [`analyze_image`] without the validation step:
    /// context + query + plain-text directive, one provider call,
    /// turn pair persisted only on success.
    ///
    /// [`analyze_image`]: InferenceGateway::analyze_image
    pub async fn analyze_prompt(&self, query: &str) -> String {
        match self.try_analyze_prompt(query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Query failed: {:#}", e);
                format!("Sorry, I encountered an error: {}. Please try again.", e)
            }
        }
    }

    async fn try_analyze_image(&self, image_data: &str, mode: PromptMode) -> Result<String> {
        // Validation happens before any remote call.
        let image = validate_image(image_data)?;

        let context = build_context(
            &self.store.history(),
            self.max_context_turns,
            ContextTarget::NewImage,
        );

        let mut instruction = instruction_for(mode);
        if !context.is_empty() {
            instruction.push_str("\n\n");
            instruction.push_str(&context);
        }

        let request = InferenceRequest::with_image(instruction, image);
        let response = self.provider.generate(&request).await?;

        self.record_turns(
            ChatMessage::user_with_image(IMAGE_TURN_PLACEHOLDER, image_data),
            ChatMessage::assistant(&response),
        );

        Ok(response)
    }

    async fn try_analyze_prompt(&self, query: &str) -> Result<String> {
        let context = build_context(
            &self.store.history(),
            self.max_context_turns,
            ContextTarget::NewQuery,
        );

        let mut instruction = String::new();
        if !context.is_empty() {
            instruction.push_str(&context);
            instruction.push('\n');
        }
        instruction.push_str(query);
        instruction.push_str("\n\n");
        instruction.push_str(PLAIN_TEXT_DIRECTIVE);

        let response = self.provider.generate(&InferenceRequest::text(instruction)).await?;

        self.record_turns(ChatMessage::user(query), ChatMessage::assistant(&response));

        Ok(response)
    }

    /// Persist the user/assistant turn pair for a successful exchange
    ///
    /// A persistence failure after a successful inference call is logged
    /// but does not fail the call; the response is still returned.
    fn record_turns(&self, user_turn: ChatMessage, assistant_turn: ChatMessage) {
        if let Err(e) = self.store.append(user_turn) {
            tracing::warn!("Failed to persist user turn: {:#}", e);
            return;
        }
        if let Err(e) = self.store.append(assistant_turn) {
            tracing::warn!("Failed to persist assistant turn: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, DEFAULT_CONTEXT_TURNS};
    use crate::test_utils::RecordingProvider;
    use std::sync::atomic::Ordering;
    use tempfile::tempdir;

    fn test_gateway(provider: RecordingProvider) -> (InferenceGateway, tempfile::TempDir) {
        let dir = tempdir().expect("tempdir");
        let store = Arc::new(
            SessionStore::new_with_path(dir.path().join("session.json")).expect("create store"),
        );
        let gateway = InferenceGateway::new(Box::new(provider), store, DEFAULT_CONTEXT_TURNS);
        (gateway, dir)
    }

    const TINY_IMAGE: &str = "data:image/jpeg;base64,aGVsbG8=";

    #[tokio::test]
    async fn test_analyze_prompt_success_appends_turn_pair() {
        let provider = RecordingProvider::returning("4");
        let calls = provider.calls();
        let (gateway, _dir) = test_gateway(provider);

        let result = gateway.analyze_prompt("What is 2+2?").await;
        assert_eq!(result, "4");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let history = gateway.store().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "What is 2+2?");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "4");
    }

    #[tokio::test]
    async fn test_analyze_prompt_failure_appends_nothing() {
        let provider = RecordingProvider::failing("service unavailable");
        let (gateway, _dir) = test_gateway(provider);

        let result = gateway.analyze_prompt("What is 2+2?").await;
        assert!(result.contains("Sorry, I encountered an error"));
        assert!(result.contains("service unavailable"));
        assert!(gateway.store().history().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_prompt_threads_context_from_history() {
        let provider = RecordingProvider::returning("8");
        let requests = provider.requests();
        let (gateway, _dir) = test_gateway(provider);

        gateway
            .store()
            .append(ChatMessage::user("What is 2+2?"))
            .unwrap();
        gateway.store().append(ChatMessage::assistant("4")).unwrap();

        gateway.analyze_prompt("And doubled?").await;

        let sent = requests.lock().unwrap();
        let instruction = &sent[0].instruction;
        assert!(instruction.contains("user: What is 2+2?"));
        assert!(instruction.contains("assistant: 4"));
        assert!(instruction.contains("Now answer for the new query."));
        assert!(instruction.contains("And doubled?"));
    }

    #[tokio::test]
    async fn test_analyze_prompt_empty_history_has_no_framing() {
        let provider = RecordingProvider::returning("42");
        let requests = provider.requests();
        let (gateway, _dir) = test_gateway(provider);

        gateway.analyze_prompt("meaning of life?").await;

        let sent = requests.lock().unwrap();
        assert!(!sent[0].instruction.contains("Previous conversation"));
        assert!(sent[0].instruction.starts_with("meaning of life?"));
    }

    #[tokio::test]
    async fn test_analyze_image_success_persists_placeholder_and_image() {
        let provider = RecordingProvider::returning("Question: 2+2\nAnswer: 4");
        let requests = provider.requests();
        let (gateway, _dir) = test_gateway(provider);

        let result = gateway.analyze_image(TINY_IMAGE, PromptMode::StepByStep).await;
        assert!(result.starts_with("Question:"));

        let history = gateway.store().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, IMAGE_TURN_PLACEHOLDER);
        assert_eq!(history[0].image_data.as_deref(), Some(TINY_IMAGE));
        assert!(history[1].image_data.is_none());

        // Inline image reached the provider without the data-URL prefix.
        let sent = requests.lock().unwrap();
        let image = sent[0].image.as_ref().expect("image attached");
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_analyze_image_mode_selects_instruction() {
        let provider = RecordingProvider::returning("ok");
        let requests = provider.requests();
        let (gateway, _dir) = test_gateway(provider);

        gateway
            .analyze_image(TINY_IMAGE, PromptMode::ExplainLikeFive)
            .await;

        let sent = requests.lock().unwrap();
        assert!(sent[0].instruction.contains("5-year-old"));
        assert!(sent[0].instruction.contains("No question to solve"));
    }

    #[tokio::test]
    async fn test_oversized_image_never_reaches_provider() {
        let provider = RecordingProvider::returning("should not be called");
        let calls = provider.calls();
        let (gateway, _dir) = test_gateway(provider);

        let payload = "A".repeat((MAX_IMAGE_BYTES / 3) * 4 + 8);
        let url = format!("data:image/jpeg;base64,{}", payload);

        let result = gateway.analyze_image(&url, PromptMode::Default).await;
        assert!(result.contains("Sorry, I encountered an error"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(gateway.store().history().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_image_never_reaches_provider() {
        let provider = RecordingProvider::returning("should not be called");
        let calls = provider.calls();
        let (gateway, _dir) = test_gateway(provider);

        let result = gateway.analyze_image("not a data url", PromptMode::Default).await;
        assert!(result.contains("Sorry, I encountered an error"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_image_failure_appends_nothing() {
        let provider = RecordingProvider::failing("model overloaded");
        let (gateway, _dir) = test_gateway(provider);

        let result = gateway.analyze_image(TINY_IMAGE, PromptMode::Default).await;
        assert!(result.contains("model overloaded"));
        assert!(gateway.store().history().is_empty());
    }

    #[tokio::test]
    async fn test_image_turns_excluded_from_later_context() {
        let provider = RecordingProvider::returning("answer");
        let requests = provider.requests();
        let (gateway, _dir) = test_gateway(provider);

        gateway.analyze_image(TINY_IMAGE, PromptMode::Default).await;
        gateway.analyze_prompt("follow-up").await;

        let sent = requests.lock().unwrap();
        // Second request's context must not contain the image placeholder turn.
        assert!(!sent[1].instruction.contains(IMAGE_TURN_PLACEHOLDER));
        assert!(sent[1].instruction.contains("assistant: answer"));
    }
}
