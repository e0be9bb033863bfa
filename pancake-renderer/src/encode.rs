//! Surface encoding to PNG, JPEG and WebP.
//!
//! Mirrors what a canvas `toDataURL` does: straight RGBA pixels in, encoded
//! bytes or a base64 data URI out.

use image::ImageEncoder;
use pancake_core::Surface;
use serde::{Deserialize, Serialize};

use crate::data_uri;
use crate::error::{RenderError, RenderResult};
use crate::format::ImageFormat;

/// Data URI a zero-area surface encodes to.
pub const EMPTY_DATA_URI: &str = "data:,";

/// Configuration for surface encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// JPEG quality 1-100 (default: 92).
    pub jpeg_quality: u8,
    /// Color transparent pixels are flattened onto for JPEG, as RGBA bytes.
    pub background: [u8; 4],
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 92,
            background: [0, 0, 0, 255],
        }
    }
}

/// Encodes [`Surface`]s to image bytes.
#[derive(Debug, Clone, Default)]
pub struct SurfaceEncoder {
    config: EncodeConfig,
}

impl SurfaceEncoder {
    /// Create a new encoder with the given configuration.
    #[must_use]
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    /// Create an encoder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EncodeConfig::default())
    }

    /// Get the encoder configuration.
    #[must_use]
    pub fn config(&self) -> &EncodeConfig {
        &self.config
    }

    /// Encode a surface to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is empty or encoding fails.
    pub fn encode(&self, surface: &Surface, format: ImageFormat) -> RenderResult<Vec<u8>> {
        if surface.is_empty() {
            return Err(RenderError::Encode(format!(
                "cannot encode {}x{} surface",
                surface.width(),
                surface.height()
            )));
        }
        match format {
            ImageFormat::Png => Self::render_to_png(surface),
            ImageFormat::Jpg => self.render_to_jpeg(surface),
            ImageFormat::WebP => Self::render_to_webp(surface),
        }
    }

    /// Encode a surface as a base64 data URI.
    ///
    /// A zero-area surface yields [`EMPTY_DATA_URI`], as a zero-sized canvas does.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_data_uri(&self, surface: &Surface, format: ImageFormat) -> RenderResult<String> {
        if surface.is_empty() {
            tracing::debug!("Encoding empty surface as {EMPTY_DATA_URI}");
            return Ok(EMPTY_DATA_URI.to_string());
        }
        let bytes = self.encode(surface, format)?;
        Ok(data_uri::encode(format.mime(), &bytes))
    }

    /// Encode a surface to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn render_to_png(surface: &Surface) -> RenderResult<Vec<u8>> {
        let mut buf = std::io::Cursor::new(Vec::new());
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                surface.data(),
                surface.width(),
                surface.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;
        Ok(buf.into_inner())
    }

    /// Encode a surface to JPEG bytes, flattening alpha onto the background.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, surface: &Surface) -> RenderResult<Vec<u8>> {
        let (width, height) = (surface.width(), surface.height());
        let bg = &self.config.background;
        let mut rgb_data = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in surface.data().chunks_exact(4) {
            let alpha = f32::from(pixel[3]) / 255.0;
            let inv = 1.0 - alpha;
            for channel in 0..3 {
                let blended = f32::from(pixel[channel]).mul_add(alpha, f32::from(bg[channel]) * inv);
                rgb_data.push(blended.round().clamp(0.0, 255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let quality = self.config.jpeg_quality.clamp(1, 100);
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
            .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Encode a surface to lossless WebP bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn render_to_webp(surface: &Surface) -> RenderResult<Vec<u8>> {
        let mut buf = std::io::Cursor::new(Vec::new());
        image::codecs::webp::WebPEncoder::new_lossless(&mut buf)
            .write_image(
                surface.data(),
                surface.width(),
                surface.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| RenderError::Encode(format!("WebP encoding failed: {e}")))?;
        Ok(buf.into_inner())
    }
}
