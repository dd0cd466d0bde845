//! Configuration management for Lenstutor
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{LenstutorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Lenstutor
///
/// This structure holds all configuration needed for the assistant,
/// including provider settings, session behavior, speech synthesis
/// and camera capture.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Provider configuration (Gemini, Ollama)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Session persistence and context settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Speech synthesis settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Camera capture settings
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use for Gemini
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API key; falls back to the `GEMINI_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional API base URL (useful for tests and local mocks)
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_key: None,
            api_base: None,
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama (needs vision support for image analysis)
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llava:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file path; defaults to the platform data directory
    #[serde(default)]
    pub file: Option<String>,

    /// Number of prior messages threaded into each request
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

fn default_context_turns() -> usize {
    crate::session::DEFAULT_CONTEXT_TURNS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: None,
            context_turns: default_context_turns(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Whether answers are spoken aloud by default
    #[serde(default = "default_speech_enabled")]
    pub enabled: bool,

    /// Speaking rate, 1.0 = synthesizer default
    #[serde(default = "default_speech_rate")]
    pub rate: f32,

    /// Voice pitch, 1.0 = synthesizer default
    #[serde(default = "default_speech_pitch")]
    pub pitch: f32,

    /// Synthesizer command override (defaults to `say` / `espeak`)
    #[serde(default)]
    pub command: Option<String>,
}

fn default_speech_enabled() -> bool {
    true
}

fn default_speech_rate() -> f32 {
    0.9
}

fn default_speech_pitch() -> f32 {
    1.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_speech_enabled(),
            rate: default_speech_rate(),
            pitch: default_speech_pitch(),
            command: None,
        }
    }
}

/// Camera capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Maximum frame width in pixels
    #[serde(default = "default_capture_width")]
    pub width: u32,

    /// Maximum frame height in pixels
    #[serde(default = "default_capture_height")]
    pub height: u32,

    /// JPEG quality in (0.0, 1.0]
    #[serde(default = "default_capture_quality")]
    pub quality: f32,

    /// Initial camera facing: "environment" or "user"
    #[serde(default = "default_capture_facing")]
    pub facing: String,

    /// Frame grabber command override
    #[serde(default)]
    pub command: Option<String>,
}

fn default_capture_width() -> u32 {
    1280
}

fn default_capture_height() -> u32 {
    720
}

fn default_capture_quality() -> f32 {
    0.92
}

fn default_capture_facing() -> String {
    "environment".to_string()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: default_capture_width(),
            height: default_capture_height(),
            quality: default_capture_quality(),
            facing: default_capture_facing(),
            command: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LenstutorError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| LenstutorError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("LENSTUTOR_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(gemini_model) = std::env::var("LENSTUTOR_GEMINI_MODEL") {
            self.provider.gemini.model = gemini_model;
        }

        if let Ok(ollama_host) = std::env::var("LENSTUTOR_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("LENSTUTOR_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        if let Ok(context_turns) = std::env::var("LENSTUTOR_CONTEXT_TURNS") {
            if let Ok(value) = context_turns.parse() {
                self.session.context_turns = value;
            } else {
                tracing::warn!("Invalid LENSTUTOR_CONTEXT_TURNS: {}", context_turns);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(session_file) = &cli.session_file {
            self.session.file = Some(session_file.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any setting is out of range or inconsistent
    pub fn validate(&self) -> Result<()> {
        match self.provider.provider_type.as_str() {
            "gemini" | "ollama" => {}
            other => {
                return Err(LenstutorError::Config(format!(
                    "Unknown provider type: {} (expected gemini or ollama)",
                    other
                ))
                .into());
            }
        }

        if self.session.context_turns == 0 {
            return Err(
                LenstutorError::Config("session.context_turns must be at least 1".to_string())
                    .into(),
            );
        }

        if !(0.0..=1.0).contains(&self.capture.quality) || self.capture.quality == 0.0 {
            return Err(LenstutorError::Config(format!(
                "capture.quality must be in (0.0, 1.0], got {}",
                self.capture.quality
            ))
            .into());
        }

        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(
                LenstutorError::Config("capture dimensions must be non-zero".to_string()).into(),
            );
        }

        crate::capture::FacingMode::parse_str(&self.capture.facing)
            .map_err(LenstutorError::Config)?;

        if self.speech.rate <= 0.0 {
            return Err(LenstutorError::Config(format!(
                "speech.rate must be positive, got {}",
                self.speech.rate
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.provider_type, "gemini");
        assert_eq!(config.provider.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.session.context_turns, 3);
        assert!(config.speech.enabled);
    }

    #[test]
    fn test_parse_minimal_yaml_fills_defaults() {
        let yaml = r#"
provider:
  type: ollama
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.provider.ollama.host, "http://localhost:11434");
        assert_eq!(config.capture.width, 1280);
        assert!((config.speech.rate - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
provider:
  type: gemini
  gemini:
    model: gemini-2.0-pro
    api_key: secret
session:
  context_turns: 5
speech:
  enabled: false
  rate: 1.2
capture:
  width: 640
  height: 480
  quality: 0.8
  facing: user
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.gemini.model, "gemini-2.0-pro");
        assert_eq!(config.provider.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.session.context_turns, 5);
        assert!(!config.speech.enabled);
        assert_eq!(config.capture.width, 640);
        assert_eq!(config.capture.facing, "user");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.provider.provider_type = "openai".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_context_turns() {
        let mut config = Config::default();
        config.session.context_turns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_quality_out_of_range() {
        let mut config = Config::default();
        config.capture.quality = 1.5;
        assert!(config.validate().is_err());
        config.capture.quality = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_facing() {
        let mut config = Config::default();
        config.capture.facing = "sideways".to_string();
        assert!(config.validate().is_err());
    }
}
