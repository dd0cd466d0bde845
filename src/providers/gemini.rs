//! Gemini provider implementation
//!
//! Connects to the Google Generative Language REST API to generate
//! one-shot completions, with optional inline image data for
//! image-grounded analysis.

use crate::config::GeminiConfig;
use crate::error::{LenstutorError, Result};
use crate::providers::{InferenceRequest, Provider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base for the Generative Language service
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini API provider
///
/// Sends a single `generateContent` call per request. The API base can
/// be overridden through configuration, which allows tests to point the
/// provider at a mock server.
///
/// # Examples
///
/// ```no_run
/// use lenstutor::config::GeminiConfig;
/// use lenstutor::providers::{GeminiProvider, InferenceRequest, Provider};
///
/// # async fn example() -> lenstutor::error::Result<()> {
/// let config = GeminiConfig {
///     model: "gemini-2.0-flash".to_string(),
///     api_key: Some("key".to_string()),
///     api_base: None,
/// };
/// let provider = GeminiProvider::new(config)?;
/// let answer = provider.generate(&InferenceRequest::text("What is 2+2?")).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

/// A single content part: either text or inline image data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

/// Generation parameters, fixed to the values the application was tuned with
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("lenstutor/0.1.0")
            .build()
            .map_err(|e| {
                LenstutorError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!("Initialized Gemini provider: model={}", config.model);

        Ok(Self { client, config })
    }

    /// Resolve the API key from config or the `GEMINI_API_KEY` env var
    fn api_key(&self) -> Result<String> {
        if let Some(key) = &self.config.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        std::env::var("GEMINI_API_KEY").map_err(|_| {
            LenstutorError::Provider(
                "Missing Gemini API key: set provider.gemini.api_key or GEMINI_API_KEY".to_string(),
            )
            .into()
        })
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        format!(
            "{}/v1beta/models/{}:generateContent",
            base, self.config.model
        )
    }

    fn build_body(request: &InferenceRequest) -> GeminiRequest {
        let mut parts = vec![GeminiPart {
            text: Some(request.instruction.clone()),
            inline_data: None,
        }];

        if let Some(image) = &request.image {
            parts.push(GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
            });
        }

        GeminiRequest {
            contents: vec![GeminiContent { parts }],
            generation_config: GenerationConfig::default(),
        }
    }

    fn extract_text(response: GeminiResponse) -> Result<String> {
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text));

        match text {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(LenstutorError::Provider("Empty response from Gemini".to_string()).into()),
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<String> {
        let key = self.api_key()?;
        let url = self.endpoint();
        let body = Self::build_body(request);

        tracing::debug!(
            "Sending Gemini request: model={}, image={}",
            self.config.model,
            request.image.is_some()
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                LenstutorError::Provider(format!("Failed to reach Gemini API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(LenstutorError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            LenstutorError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        Self::extract_text(parsed)
    }
}
