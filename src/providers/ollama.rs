//! Ollama provider implementation
//!
//! Connects to a local or remote Ollama server for offline-friendly
//! inference. Image-grounded requests use Ollama's multimodal message
//! format (base64 images attached to the user message).

use crate::config::OllamaConfig;
use crate::error::{LenstutorError, Result};
use crate::providers::{InferenceRequest, Provider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// Sends one non-streaming `/api/chat` call per request. Only models
/// with vision support (e.g. llava) can answer image-grounded requests;
/// the server rejects the call otherwise and the error is surfaced.
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for the Ollama chat API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

/// Message structure for the Ollama chat API
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

/// Response structure from the Ollama chat API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use lenstutor::config::OllamaConfig;
    /// use lenstutor::providers::OllamaProvider;
    ///
    /// let config = OllamaConfig {
    ///     host: "http://localhost:11434".to_string(),
    ///     model: "llava:latest".to_string(),
    /// };
    /// let provider = OllamaProvider::new(config);
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("lenstutor/0.1.0")
            .build()
            .map_err(|e| {
                LenstutorError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    fn build_body(&self, request: &InferenceRequest) -> OllamaRequest {
        OllamaRequest {
            model: self.config.model.clone(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: request.instruction.clone(),
                images: request.image.as_ref().map(|image| vec![image.data.clone()]),
            }],
            stream: false,
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<String> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let body = self.build_body(request);

        tracing::debug!(
            "Sending Ollama request: model={}, image={}",
            self.config.model,
            request.image.is_some()
        );

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            LenstutorError::Provider(format!("Failed to connect to Ollama server: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(LenstutorError::Provider(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let parsed: OllamaResponse = response.json().await.map_err(|e| {
            LenstutorError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        if parsed.message.content.is_empty() {
            return Err(LenstutorError::Provider("Empty response from Ollama".to_string()).into());
        }

        Ok(parsed.message.content)
    }
}
