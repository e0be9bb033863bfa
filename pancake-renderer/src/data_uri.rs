//! Data URI encoding and decoding.
//!
//! Supports URIs like `data:image/png;base64,iVBORw0KGgo...` as well as
//! percent-encoded payloads.

use base64::Engine;
use pancake_core::Surface;

use crate::error::{RenderError, RenderResult};

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Media type, `text/plain` when the URI omits one.
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Build a base64 data URI.
#[must_use]
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{payload}")
}

/// Parse a data URI into its media type and payload.
///
/// # Errors
///
/// Returns an error if the data URI is malformed.
pub fn decode(uri: &str) -> RenderResult<DataUri> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    // Find the comma separating metadata from data
    let comma_pos = uri_data
        .find(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let metadata = &uri_data[..comma_pos];
    let encoded_data = &uri_data[comma_pos + 1..];

    let mut params = metadata.split(';');
    let mime = match params.next() {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data)
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?
    } else {
        percent_decode(encoded_data)?
    };

    Ok(DataUri { mime, bytes })
}

/// Decode an image data URI back into pixels.
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be decoded.
pub fn decode_to_surface(uri: &str) -> RenderResult<Surface> {
    let data = decode(uri)?;
    let img = image::load_from_memory(&data.bytes)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Surface::from_rgba(width, height, rgba.into_raw())?)
}

/// Percent-decoding of a non-base64 payload.
fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}
