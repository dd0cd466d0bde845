//! Base provider trait and common types
//!
//! Defines the Provider trait that all inference providers implement,
//! along with the request structures shared between them. The contract
//! with a provider is deliberately small: send one composed prompt
//! (optionally with an inline image), await one text response.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An inline image attached to an inference request
///
/// The payload is raw base64 without any data-URL prefix; the MIME type
/// is declared separately, the way provider wire formats expect it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineImage {
    /// Declared MIME type, e.g. "image/jpeg"
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

/// One composed inference request
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Full instruction text: mode instruction, context window, and query
    pub instruction: String,
    /// Optional inline image for image-grounded analysis
    pub image: Option<InlineImage>,
}

impl InferenceRequest {
    /// Creates a pure-text request
    ///
    /// # Examples
    ///
    /// ```
    /// use lenstutor::providers::InferenceRequest;
    ///
    /// let request = InferenceRequest::text("What is 2+2?");
    /// assert!(request.image.is_none());
    /// ```
    pub fn text(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            image: None,
        }
    }

    /// Creates an image-grounded request
    ///
    /// # Examples
    ///
    /// ```
    /// use lenstutor::providers::{InferenceRequest, InlineImage};
    ///
    /// let image = InlineImage {
    ///     mime_type: "image/jpeg".to_string(),
    ///     data: "aGVsbG8=".to_string(),
    /// };
    /// let request = InferenceRequest::with_image("Solve this", image);
    /// assert!(request.image.is_some());
    /// ```
    pub fn with_image(instruction: impl Into<String>, image: InlineImage) -> Self {
        Self {
            instruction: instruction.into(),
            image: Some(image),
        }
    }
}

/// Trait implemented by all inference providers
///
/// Providers are treated as unreliable collaborators with unbounded
/// latency: a call may reject, and callers are expected to surface the
/// failure rather than retry internally.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier for logging ("gemini", "ollama")
    fn name(&self) -> &str;

    /// Send one composed request and await one text response
    async fn generate(&self, request: &InferenceRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request_has_no_image() {
        let request = InferenceRequest::text("hello");
        assert_eq!(request.instruction, "hello");
        assert!(request.image.is_none());
    }

    #[test]
    fn test_with_image_attaches_payload() {
        let image = InlineImage {
            mime_type: "image/jpeg".to_string(),
            data: "ZGF0YQ==".to_string(),
        };
        let request = InferenceRequest::with_image("solve", image);
        let attached = request.image.expect("image attached");
        assert_eq!(attached.mime_type, "image/jpeg");
        assert_eq!(attached.data, "ZGF0YQ==");
    }
}
