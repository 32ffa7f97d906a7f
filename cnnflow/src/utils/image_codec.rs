//! Base64 image payload helpers for prediction clients.

use crate::errors::PipelineError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

/// Decodes a base64 image payload and writes the bytes to `path`.
///
/// # Errors
///
/// Returns an error if the payload is not valid base64 or the write fails.
pub fn decode_image(encoded: &str, path: &Path) -> Result<(), PipelineError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| PipelineError::Internal(format!("Invalid base64 image payload: {e}")))?;
    std::fs::write(path, bytes).map_err(|e| PipelineError::io(path, e))
}

/// Reads an image file and returns its contents as base64.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn encode_image_into_base64(path: &Path) -> Result<String, PipelineError> {
    let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent GIF
    const PIXEL: &str = "R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

    #[test]
    fn test_decode_then_encode_preserves_payload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pixel.gif");

        decode_image(PIXEL, &path).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"GIF89a"));
        assert_eq!(encode_image_into_base64(&path).unwrap(), PIXEL);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.png");

        assert!(decode_image("not base64 !!", &path).is_err());
        assert!(!path.exists());
    }
}
