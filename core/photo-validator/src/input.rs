use image::{DynamicImage, ImageFormat};

use crate::error::ValidationError;

/// Decode input bytes into a `DynamicImage`.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, ValidationError> {
    image::load_from_memory(input).map_err(|e| ValidationError::DecodeError(e.to_string()))
}

/// Detect the input image format from the raw bytes.
pub(crate) fn detect_format(input: &[u8]) -> Result<ImageFormat, ValidationError> {
    image::guess_format(input).map_err(|e| ValidationError::DecodeError(e.to_string()))
}

/// MIME type of the encoded bytes, as a browser would report it for an upload.
pub fn sniff_mime_type(input: &[u8]) -> Result<&'static str, ValidationError> {
    detect_format(input).map(|format| format.to_mime_type())
}
