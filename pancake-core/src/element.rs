//! Page elements - the nodes of a [`Document`](crate::Document).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Attributes, Surface};

/// Unique identifier for an element.
///
/// This is the model's node handle, not the markup `id` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an element can be flattened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// An `<svg>` container that needs rasterizing.
    VectorGraphic,
    /// A `<canvas>` already backed by pixels.
    RasterCanvas,
    /// Anything else.
    Other,
}

impl ElementKind {
    /// Classify a tag name, ignoring ASCII case.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("svg") {
            Self::VectorGraphic
        } else if tag.eq_ignore_ascii_case("canvas") {
            Self::RasterCanvas
        } else {
            Self::Other
        }
    }
}

/// Rendered box size in CSS pixels, standing in for `scrollWidth`/`scrollHeight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSize {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl LayoutSize {
    /// Create a layout size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A page element with tag, attributes and tree links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Tag name as written (case is significant inside SVG).
    pub tag: String,
    /// Markup attributes, in order.
    pub attributes: Attributes,
    /// Character data. Only text nodes carry it.
    pub text: Option<String>,
    /// Child element IDs, in order.
    pub children: Vec<ElementId>,
    /// Parent element ID, `None` when detached or the document root.
    pub parent: Option<ElementId>,
    /// Explicit rendered size, when known.
    pub layout: Option<LayoutSize>,
    /// Pixel backing for canvas elements.
    pub surface: Option<Surface>,
}

impl Element {
    /// Tag used for text nodes.
    pub const TEXT_TAG: &'static str = "#text";

    /// Create a new detached element.
    ///
    /// Canvas elements start with a blank 300x150 surface.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let surface = (ElementKind::from_tag(&tag) == ElementKind::RasterCanvas)
            .then(Surface::default);
        Self {
            id: ElementId::new(),
            tag,
            attributes: Attributes::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            layout: None,
            surface,
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.set(name, value.to_string());
        self
    }

    /// Create a detached text node.
    #[must_use]
    pub fn text_node(content: impl Into<String>) -> Self {
        let mut node = Self::new(Self::TEXT_TAG);
        node.text = Some(content.into());
        node
    }

    /// True for text nodes.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.tag == Self::TEXT_TAG
    }

    /// Set the rendered size.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSize) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Replace the pixel surface.
    #[must_use]
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Classify this element.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        ElementKind::from_tag(&self.tag)
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// The markup `id` attribute, if set and non-empty.
    #[must_use]
    pub fn html_id(&self) -> Option<&str> {
        self.attribute("id").filter(|id| !id.is_empty())
    }

    /// Best-effort rendered pixel size.
    ///
    /// Uses the explicit layout size when one was recorded, otherwise the
    /// numeric `width`/`height` attributes. Percentages and other relative
    /// lengths are unknown and count as zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scroll_size(&self) -> (u32, u32) {
        if let Some(layout) = self.layout {
            return (
                layout.width.max(0.0).round() as u32,
                layout.height.max(0.0).round() as u32,
            );
        }
        (
            self.attribute("width").map_or(0, parse_pixel_length),
            self.attribute("height").map_or(0, parse_pixel_length),
        )
    }
}

/// Parse an absolute pixel length such as `"400"` or `"400px"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_pixel_length(value: &str) -> u32 {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    match number.parse::<f32>() {
        Ok(n) if n.is_finite() && n > 0.0 => n.round() as u32,
        _ => 0,
    }
}
