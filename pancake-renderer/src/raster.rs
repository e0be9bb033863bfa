//! SVG rasterization.
//!
//! The converter never paints vector markup itself; it hands serialized
//! markup and a scratch [`Surface`] to a [`Rasterizer`].

use pancake_core::Surface;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// Options passed to a rasterizer with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterOptions {
    /// Do not install pointer/cursor handling for the painted markup.
    pub ignore_mouse: bool,
    /// Paint a single static frame; do not play animations.
    pub ignore_animation: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            ignore_mouse: true,
            ignore_animation: true,
        }
    }
}

/// Paints SVG markup into a surface.
pub trait Rasterizer {
    /// Paint `markup` into `surface`, synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Rasterization`] if the markup cannot be painted.
    fn rasterize(&self, surface: &mut Surface, markup: &str, options: &RasterOptions)
        -> RenderResult<()>;
}

/// Rasterizer backed by usvg/resvg/tiny-skia.
///
/// Markup is drawn at its natural size from the top-left corner, clipped
/// to the surface.
#[derive(Debug, Clone, Default)]
pub struct ResvgRasterizer {
    load_system_fonts: bool,
}

impl ResvgRasterizer {
    /// Create a rasterizer without system fonts (text is not drawn).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load system fonts so `<text>` can be drawn.
    #[must_use]
    pub fn with_system_fonts(mut self) -> Self {
        self.load_system_fonts = true;
        self
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(
        &self,
        surface: &mut Surface,
        markup: &str,
        options: &RasterOptions,
    ) -> RenderResult<()> {
        let mut opt = usvg::Options::default();
        if self.load_system_fonts {
            std::sync::Arc::make_mut(&mut opt.fontdb).load_system_fonts();
        }
        let tree = usvg::Tree::from_str(markup, &opt)
            .map_err(|e| RenderError::Rasterization(format!("SVG parsing failed: {e}")))?;

        // resvg only ever paints one static, non-interactive frame.
        tracing::debug!(
            ignore_mouse = options.ignore_mouse,
            ignore_animation = options.ignore_animation,
            "Rasterizing {}x{} SVG onto {}x{} surface",
            tree.size().width(),
            tree.size().height(),
            surface.width(),
            surface.height()
        );

        if surface.is_empty() {
            return Ok(());
        }

        let mut pixmap = tiny_skia::Pixmap::new(surface.width(), surface.height())
            .ok_or_else(|| RenderError::Rasterization("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        for (dst, px) in surface.data_mut().chunks_exact_mut(4).zip(pixmap.pixels()) {
            let c = px.demultiply();
            dst.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(())
    }
}
