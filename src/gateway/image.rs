//! Image payload validation
//!
//! Validates encoded image data URLs before any remote call is made.
//! Validation failures are local and cheap: no base64 decode is
//! performed, the decoded size is estimated from the payload length.

use crate::error::LenstutorError;
use crate::providers::InlineImage;

/// Ceiling on the estimated decoded image size
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

/// Validate an image data URL and split it into MIME type and payload
///
/// Accepts only `data:image/...;base64,` URLs whose estimated decoded
/// size is under [`MAX_IMAGE_BYTES`]. Fails fast with a descriptive
/// error before the provider is ever contacted.
///
/// # Examples
///
/// ```
/// use lenstutor::gateway::validate_image;
///
/// let image = validate_image("data:image/jpeg;base64,aGVsbG8=").unwrap();
/// assert_eq!(image.mime_type, "image/jpeg");
/// assert_eq!(image.data, "aGVsbG8=");
/// ```
pub fn validate_image(image_data: &str) -> std::result::Result<InlineImage, LenstutorError> {
    if !image_data.starts_with("data:image/") {
        return Err(LenstutorError::InvalidImage(
            "not an image data URL".to_string(),
        ));
    }

    let rest = &image_data["data:".len()..];
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| LenstutorError::InvalidImage("malformed data URL".to_string()))?;

    let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
        LenstutorError::InvalidImage("image data URL is not base64-encoded".to_string())
    })?;

    if payload.is_empty() {
        return Err(LenstutorError::InvalidImage(
            "empty image payload".to_string(),
        ));
    }

    // Estimated decoded size; 4 base64 chars encode 3 bytes.
    let estimated_bytes = payload.len() * 3 / 4;
    if estimated_bytes >= MAX_IMAGE_BYTES {
        return Err(LenstutorError::InvalidImage(format!(
            "image is too large ({} bytes estimated, limit {})",
            estimated_bytes, MAX_IMAGE_BYTES
        )));
    }

    Ok(InlineImage {
        mime_type: mime_type.to_string(),
        data: payload.to_string(),
    })
}
