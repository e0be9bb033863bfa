//! Flattening an `<svg>` or `<canvas>` into an image.
//!
//! ```text
//! resolve ──► svg?    ──► clone ──► markup ──► Rasterizer ──┐
//!         └─► canvas? ──► clone surface ─────────────────────┤
//!                                                            ▼
//!                            encode ──► data URI ──► ImageHandle
//! ```

use pancake_core::{
    Attributes, Document, Element, ElementId, ElementKind, Host, MouseEvent, Surface,
};
use serde::{Deserialize, Serialize};

use crate::encode::{EncodeConfig, SurfaceEncoder};
use crate::error::{RenderError, RenderResult};
use crate::format::ImageFormat;
use crate::handle::ImageHandle;
use crate::raster::{RasterOptions, Rasterizer, ResvgRasterizer};

/// SVG namespace added to detached clones that lack one.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// XLink namespace added alongside it.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Base name for downloads when the converter has no identifier.
const DEFAULT_FILE_STEM: &str = "image";

/// Where to find an element: by markup `id` or by handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Markup `id` attribute, looked up with `get_element_by_id`.
    Id(String),
    /// An element the caller already resolved.
    Element(ElementId),
}

impl Source {
    fn resolve(&self, document: &Document) -> Option<ElementId> {
        match self {
            Self::Id(html_id) => document.get_element_by_id(html_id),
            Self::Element(id) => document.contains(*id).then_some(*id),
        }
    }
}

impl From<&str> for Source {
    fn from(html_id: &str) -> Self {
        Self::Id(html_id.to_string())
    }
}

impl From<String> for Source {
    fn from(html_id: String) -> Self {
        Self::Id(html_id)
    }
}

impl From<ElementId> for Source {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(html_id) => write!(f, "#{html_id}"),
            Self::Element(id) => write!(f, "element {id}"),
        }
    }
}

/// Options for [`Converter::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Requested format token (`png`, `jpg`, `image/jpeg`, ...).
    pub format: Option<String>,
    /// Attributes for the output image. A `format` entry overrides
    /// [`format`](Self::format); `src` is ignored.
    pub attributes: Attributes,
    /// Encoder settings.
    pub encode: EncodeConfig,
    /// Settings passed to the rasterizer for SVG sources.
    pub raster: RasterOptions,
}

impl ConvertOptions {
    /// Set the format token.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Add an output image attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.set(name, value.to_string());
        self
    }

    /// Replace all output image attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Parse options from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe valid options.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve the effective format and the attributes left to apply.
    fn split_format(&self) -> (ImageFormat, Attributes) {
        let mut attributes = self.attributes.clone();
        let token = attributes.remove("format").or_else(|| self.format.clone());
        (ImageFormat::normalize(token.as_deref()), attributes)
    }
}

/// A flattened `<svg>` or `<canvas>`.
///
/// Built once by [`Converter::new`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Converter {
    identifier: Option<String>,
    source_kind: ElementKind,
    width: u32,
    height: u32,
    format: ImageFormat,
    data_uri: String,
    image: ImageHandle,
}

impl Converter {
    /// Flatten `source` using the default resvg rasterizer.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidInput`] if `source` does not resolve,
    /// [`RenderError::UnsupportedElement`] if it is not an `<svg>` or
    /// `<canvas>`, or a rasterization/encoding error.
    pub fn new(
        document: &mut Document,
        source: impl Into<Source>,
        options: ConvertOptions,
    ) -> RenderResult<Self> {
        Self::with_rasterizer(document, source, options, &ResvgRasterizer::new())
    }

    /// Flatten `source`, painting SVG with `rasterizer`.
    ///
    /// # Errors
    ///
    /// See [`Converter::new`].
    pub fn with_rasterizer(
        document: &mut Document,
        source: impl Into<Source>,
        options: ConvertOptions,
        rasterizer: &dyn Rasterizer,
    ) -> RenderResult<Self> {
        let source = source.into();
        let element_id = source
            .resolve(document)
            .ok_or_else(|| RenderError::InvalidInput(source.to_string()))?;
        let element = document
            .element(element_id)
            .ok_or_else(|| RenderError::InvalidInput(source.to_string()))?;

        let identifier = match &source {
            Source::Id(html_id) => Some(html_id.clone()),
            Source::Element(_) => element.html_id().map(str::to_string),
        };
        let source_kind = element.kind();
        let (scroll_width, scroll_height) = element.scroll_size();
        let tag = element.tag.clone();

        let surface = match source_kind {
            ElementKind::VectorGraphic => {
                if !Surface::fits(scroll_width, scroll_height) {
                    return Err(RenderError::Rasterization(format!(
                        "{scroll_width}x{scroll_height} exceeds the maximum surface size"
                    )));
                }
                let mut scratch = Surface::new(scroll_width, scroll_height);
                let markup = detached_markup(document, element_id)?;
                rasterizer.rasterize(&mut scratch, &markup, &options.raster)?;
                scratch
            }
            ElementKind::RasterCanvas => cloned_surface(document, element_id)?,
            ElementKind::Other => return Err(RenderError::UnsupportedElement(tag)),
        };

        let (format, attributes) = options.split_format();
        let encoder = SurfaceEncoder::new(options.encode);
        let data_uri = encoder.to_data_uri(&surface, format)?;
        let (width, height) = (surface.width(), surface.height());
        drop(surface);

        let image = ImageHandle::new(&data_uri, Some(width), Some(height), &attributes);

        tracing::debug!(
            "Flattened {source} ({source_kind:?}, {width}x{height}) to {format}, {} byte data URI",
            data_uri.len()
        );

        Ok(Self {
            identifier,
            source_kind,
            width,
            height,
            format,
            data_uri,
            image,
        })
    }

    /// Name captured from the source, if any.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Which kind of element was flattened.
    #[must_use]
    pub fn source_kind(&self) -> ElementKind {
        self.source_kind
    }

    /// Source width in pixels. Best-effort for SVG sources; 0 when unknown.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source height in pixels. Best-effort for SVG sources; 0 when unknown.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Output format.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The encoded image as a base64 data URI.
    #[must_use]
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// The output image element.
    #[must_use]
    pub fn image(&self) -> &ImageHandle {
        &self.image
    }

    /// Replace `target` in the page with a new `<img>` for this image.
    ///
    /// The image takes `target`'s position; `target` is left detached.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidInput`] if `target` does not resolve to
    /// an element that has a parent.
    pub fn replace(
        &self,
        document: &mut Document,
        target: impl Into<Source>,
    ) -> RenderResult<&Self> {
        let target = target.into();
        let (target_id, parent) = target
            .resolve(document)
            .and_then(|id| Some((id, document.parent(id)?)))
            .ok_or_else(|| RenderError::InvalidInput(target.to_string()))?;

        let img = self.image.mount(document);
        let next = document.next_sibling(target_id);
        if let Err(e) = document.insert_before(parent, img, next) {
            document.release(img)?;
            return Err(e.into());
        }
        document.remove_child(parent, target_id)?;

        tracing::debug!("Replaced {target} with flattened image");
        Ok(self)
    }

    /// File name [`download`](Self::download) will suggest.
    ///
    /// An explicit non-empty name wins, then `<identifier>.<format>`, then
    /// `image.<format>`.
    #[must_use]
    pub fn download_filename(&self, filename: Option<&str>) -> String {
        match filename.filter(|f| !f.is_empty()) {
            Some(name) => name.to_string(),
            None => format!(
                "{}.{}",
                self.identifier.as_deref().unwrap_or(DEFAULT_FILE_STEM),
                self.format.extension()
            ),
        }
    }

    /// Ask `host` to download the image, via a transient `<a download>`.
    ///
    /// Best-effort: page model failures are logged and the host decides
    /// what activation does.
    pub fn download(
        &self,
        document: &mut Document,
        host: &mut dyn Host,
        filename: Option<&str>,
    ) -> &Self {
        let filename = self.download_filename(filename);
        let anchor = document.add_element(
            Element::new("a")
                .with_attribute("href", &self.data_uri)
                .with_attribute("download", &filename),
        );

        let body = document.body();
        match document.append_child(body, anchor) {
            Ok(()) => {
                if !host.click(document, anchor) {
                    tracing::debug!("Host has no native click, dispatching synthesized event");
                    host.dispatch_event(document, anchor, &MouseEvent::click());
                }
                if let Err(e) = document.remove_child(body, anchor) {
                    tracing::warn!("Failed to detach download anchor: {e}");
                }
            }
            Err(e) => tracing::warn!("Failed to attach download anchor: {e}"),
        }
        if let Err(e) = document.release(anchor) {
            tracing::warn!("Failed to release download anchor: {e}");
        }

        tracing::debug!("Requested download of {filename}");
        self
    }
}

/// Serialize a detached deep clone of an `<svg>`, namespaced for parsing.
fn detached_markup(document: &mut Document, source: ElementId) -> RenderResult<String> {
    let clone = document.clone_node(source, true)?;
    if let Some(element) = document.element_mut(clone) {
        if !element.attributes.contains("xmlns") {
            element.attributes.set("xmlns", SVG_NAMESPACE);
        }
        if !element.attributes.contains("xmlns:xlink") {
            element.attributes.set("xmlns:xlink", XLINK_NAMESPACE);
        }
    }

    let container = document.create_element("div");
    document.append_child(container, clone)?;
    let markup = document.inner_markup(container);
    document.release(container)?;
    Ok(markup?)
}

/// Copy a canvas's pixels via a detached clone.
fn cloned_surface(document: &mut Document, source: ElementId) -> RenderResult<Surface> {
    let clone = document.clone_node(source, true)?;
    let surface = document
        .element_mut(clone)
        .and_then(|e| e.surface.take())
        .unwrap_or_else(|| Surface::new(0, 0));
    document.release(clone)?;
    Ok(surface)
}
