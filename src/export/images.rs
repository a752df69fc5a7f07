//! Shared image decoding for both export backends.
//!
//! Submission photos and signatures arrive as base64 strings, optionally
//! carrying a `data:<mime>;base64,` prefix. A payload that fails to decode is
//! a per-image condition: the backend logs it and leaves the cell empty, the
//! export itself continues.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::GenericImageView;
use thiserror::Error;

/// Raw image bytes plus the raster extents both backends need for fitting.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("undecodable raster data: {0}")]
    Raster(#[from] image::ImageError),
}

/// Decode a base64 image payload into raw bytes and probe its dimensions.
///
/// Whitespace inside the payload (line-wrapped base64) is tolerated.
pub fn decode_image_payload(payload: &str) -> Result<DecodedImage, ImageDecodeError> {
    let raw = strip_data_uri(payload);
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(cleaned.as_bytes())?;
    let probe = image::load_from_memory(&bytes)?;
    let (width, height) = probe.dimensions();
    Ok(DecodedImage {
        bytes,
        width,
        height,
    })
}

/// Strip a `data:<mime>;base64,` prefix if one is present.
fn strip_data_uri(payload: &str) -> &str {
    if payload.starts_with("data:") {
        match payload.find(',') {
            Some(idx) => &payload[idx + 1..],
            None => payload,
        }
    } else {
        payload
    }
}
