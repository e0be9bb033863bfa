//! Raster pixel surfaces backing canvas elements.

use serde::{Deserialize, Serialize};

use crate::{DocumentError, DocumentResult};

/// Default canvas width when markup gives none.
pub const DEFAULT_CANVAS_WIDTH: u32 = 300;
/// Default canvas height when markup gives none.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 150;
/// Largest width or height a surface may have, matching common browser limits.
pub const MAX_SURFACE_DIMENSION: u32 = 32_767;
/// Largest pixel count a surface may have (16384 x 16384).
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

/// A straight (non-premultiplied) RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Create a fully transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    /// Check whether a `width` x `height` surface is within the size limits.
    ///
    /// Zero-area sizes always fit.
    #[must_use]
    pub fn fits(width: u32, height: u32) -> bool {
        width <= MAX_SURFACE_DIMENSION
            && height <= MAX_SURFACE_DIMENSION
            && u64::from(width) * u64::from(height) <= MAX_SURFACE_AREA
    }

    /// Wrap existing RGBA pixel data.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not exactly `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> DocumentResult<Self> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(DocumentError::InvalidOperation(format!(
                "surface {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the surface has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Fill every pixel with one color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Read a pixel. Returns `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let idx = self.index(x, y)?;
        let mut out = [0; 4];
        out.copy_from_slice(&self.data[idx..idx + 4]);
        Some(out)
    }

    /// Write a pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx..idx + 4].copy_from_slice(&rgba);
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}
