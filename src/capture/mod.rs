//! Camera frame capture
//!
//! Owns camera access and screenshot extraction. A frame source yields
//! raw encoded frame bytes (or nothing when no frame is available);
//! the capture layer decodes, scales into the configured constraint
//! box, and re-encodes as a JPEG data URL ready for the gateway.

use crate::error::{LenstutorError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::fmt;
use std::path::PathBuf;

/// Which camera the capture faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Front-facing camera
    User,
    /// Rear-facing camera (default)
    Environment,
}

impl FacingMode {
    /// The other facing mode
    pub fn toggled(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    /// Parse a facing mode from a string
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "user" | "front" => Ok(Self::User),
            "environment" | "back" => Ok(Self::Environment),
            other => Err(format!("Unknown facing mode: {}", other)),
        }
    }

    /// Device index passed to grabber commands
    fn device_index(self) -> u32 {
        match self {
            Self::Environment => 0,
            Self::User => 1,
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// Video constraints applied to captured frames
#[derive(Debug, Clone)]
pub struct CaptureConstraints {
    /// Maximum frame width in pixels
    pub width: u32,
    /// Maximum frame height in pixels
    pub height: u32,
    /// JPEG quality in (0.0, 1.0]
    pub quality: f32,
    /// Active camera facing
    pub facing: FacingMode,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            quality: 0.92,
            facing: FacingMode::Environment,
        }
    }
}

/// Source of raw encoded frame bytes
///
/// Returns `Ok(None)` when no frame is available; the caller decides
/// whether that is an error.
pub trait FrameSource: Send {
    fn grab(&mut self, constraints: &CaptureConstraints) -> Result<Option<Vec<u8>>>;
}

/// Frame source backed by a still image file
///
/// Used for `--image` input and under test.
pub struct FileFrameSource {
    path: PathBuf,
}

impl FileFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSource for FileFrameSource {
    fn grab(&mut self, _constraints: &CaptureConstraints) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(bytes))
    }
}

/// Frame source that runs an external grabber command
///
/// The command template supports `{output}`, `{width}`, `{height}` and
/// `{device}` placeholders and must write one encoded frame to the
/// output path. Defaults to `imagesnap` on macOS and `fswebcam`
/// elsewhere.
pub struct CommandFrameSource {
    command: String,
}

impl CommandFrameSource {
    pub fn new(command_override: Option<String>) -> Self {
        let command = command_override.unwrap_or_else(|| default_grab_command().to_string());
        Self { command }
    }
}

/// Platform default frame grabber command
pub fn default_grab_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "imagesnap -w 1 {output}"
    } else {
        "fswebcam --no-banner -d /dev/video{device} -r {width}x{height} {output}"
    }
}

impl FrameSource for CommandFrameSource {
    fn grab(&mut self, constraints: &CaptureConstraints) -> Result<Option<Vec<u8>>> {
        let output = std::env::temp_dir().join(format!("lenstutor-frame-{}.jpg", std::process::id()));

        let command = self
            .command
            .replace("{output}", &output.to_string_lossy())
            .replace("{width}", &constraints.width.to_string())
            .replace("{height}", &constraints.height.to_string())
            .replace("{device}", &constraints.facing.device_index().to_string());

        tracing::debug!("Grabbing frame: {}", command);
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(&command)
            .status()
            .map_err(|e| LenstutorError::Capture(format!("Failed to run grabber: {}", e)))?;

        if !status.success() {
            tracing::warn!("Frame grabber exited with {}", status);
            // A failed grabber may still have written a partial file.
            let _ = std::fs::remove_file(&output);
            return Ok(None);
        }

        let bytes = std::fs::read(&output);
        let _ = std::fs::remove_file(&output);
        match bytes {
            Ok(bytes) if !bytes.is_empty() => Ok(Some(bytes)),
            _ => Ok(None),
        }
    }
}

/// Camera wrapper producing data-URL screenshots
pub struct CameraCapture {
    source: Box<dyn FrameSource>,
    constraints: CaptureConstraints,
}

impl CameraCapture {
    pub fn new(source: Box<dyn FrameSource>, constraints: CaptureConstraints) -> Self {
        Self {
            source,
            constraints,
        }
    }

    /// Currently active camera facing
    pub fn facing(&self) -> FacingMode {
        self.constraints.facing
    }

    /// Switch between front and back camera; returns the new facing
    pub fn toggle_facing(&mut self) -> FacingMode {
        self.constraints.facing = self.constraints.facing.toggled();
        self.constraints.facing
    }

    /// Extract one screenshot as a `data:image/jpeg;base64,` URL
    ///
    /// Fails visibly when the source has no frame available; no remote
    /// call should be attempted in that case.
    pub fn screenshot(&mut self) -> Result<String> {
        let bytes = self
            .source
            .grab(&self.constraints)?
            .ok_or_else(|| LenstutorError::Capture("no frame available".to_string()))?;

        let frame = image::load_from_memory(&bytes)
            .map_err(|e| LenstutorError::Capture(format!("Failed to decode frame: {}", e)))?;

        let frame = if frame.width() > self.constraints.width
            || frame.height() > self.constraints.height
        {
            frame.resize(
                self.constraints.width,
                self.constraints.height,
                FilterType::Triangle,
            )
        } else {
            frame
        };

        // JPEG has no alpha channel.
        let frame = image::DynamicImage::ImageRgb8(frame.to_rgb8());

        let quality = (self.constraints.quality * 100.0).clamp(1.0, 100.0) as u8;
        let mut encoded = Vec::new();
        frame
            .write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, quality))
            .map_err(|e| LenstutorError::Capture(format!("Failed to encode frame: {}", e)))?;

        Ok(format!(
            "data:image/jpeg;base64,{}",
            STANDARD.encode(&encoded)
        ))
    }
}
