//! HTML import via `scraper`.

use scraper::node::Element as ParsedElement;
use scraper::{ElementRef, Html, Node};

use crate::element::ElementKind;
use crate::surface::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::{Document, DocumentError, DocumentResult, Element, ElementId, Surface};

impl Document {
    /// Build a document from an HTML page.
    ///
    /// The `<body>` subtree is imported, text included, in source order.
    /// Attributes keep their prefix (`xlink:href`, `xml:space`). Canvas
    /// elements get a blank surface sized from their `width`/`height`
    /// attributes; one beyond the surface limits gets an empty surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the parsed page has no body.
    pub fn from_html(html: &str) -> DocumentResult<Self> {
        let parsed = Html::parse_document(html);
        let body = parsed
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "body")
            .ok_or_else(|| DocumentError::Markup("document has no <body>".to_string()))?;

        let mut doc = Self::new();
        let body_id = doc.body();
        for (name, value) in qualified_attrs(body.value()) {
            doc.set_attribute(body_id, &name, value)?;
        }
        doc.import_children(body, body_id)?;

        tracing::debug!("Imported HTML page with {} elements", doc.element_count());
        Ok(doc)
    }

    fn import_children(&mut self, source: ElementRef<'_>, parent: ElementId) -> DocumentResult<()> {
        for child in source.children() {
            let id = match child.value() {
                Node::Text(t) => self.add_element(Element::text_node(&**t)),
                Node::Element(_) => match ElementRef::wrap(child) {
                    Some(child_ref) => self.import_element(child_ref)?,
                    None => continue,
                },
                _ => continue,
            };
            self.append_child(parent, id)?;
        }
        Ok(())
    }

    fn import_element(&mut self, source: ElementRef<'_>) -> DocumentResult<ElementId> {
        let value = source.value();
        let mut element = Element::new(value.name());
        for (name, attr) in qualified_attrs(value) {
            element.attributes.set(name, attr);
        }
        if element.kind() == ElementKind::RasterCanvas {
            let width = canvas_dimension(value.attr("width"), DEFAULT_CANVAS_WIDTH);
            let height = canvas_dimension(value.attr("height"), DEFAULT_CANVAS_HEIGHT);
            let surface = if Surface::fits(width, height) {
                Surface::new(width, height)
            } else {
                tracing::warn!("Canvas {width}x{height} exceeds the maximum surface size");
                Surface::new(0, 0)
            };
            element.surface = Some(surface);
        }

        let id = self.add_element(element);
        self.import_children(source, id)?;
        Ok(id)
    }
}

/// Attribute names as written, with any namespace prefix.
fn qualified_attrs(element: &ParsedElement) -> impl Iterator<Item = (String, &str)> {
    element.attrs.iter().map(|(name, value)| {
        let qualified = match &name.prefix {
            Some(prefix) => format!("{prefix}:{}", name.local),
            None => name.local.to_string(),
        };
        (qualified, &**value)
    })
}

/// Canvas `width`/`height` are non-negative integers; anything else
/// falls back to the default.
fn canvas_dimension(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}
