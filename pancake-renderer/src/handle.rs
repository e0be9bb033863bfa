//! The image element a flattened source is exposed as.

use std::fmt::Write;

use pancake_core::document::escape_xml;
use pancake_core::{Attributes, Document, ElementId};
use serde::{Deserialize, Serialize};

/// An immutable description of an `<img>` element.
///
/// `src` is always the data URI it was built from; caller attributes named
/// `src` (in any case) are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle {
    attributes: Attributes,
}

impl ImageHandle {
    /// Build a handle. Dimensions are only set when positive.
    #[must_use]
    pub fn new(src: &str, width: Option<u32>, height: Option<u32>, extra: &Attributes) -> Self {
        let mut attributes = Attributes::new();
        attributes.set("src", src);
        if let Some(h) = height.filter(|&h| h > 0) {
            attributes.set("height", h.to_string());
        }
        if let Some(w) = width.filter(|&w| w > 0) {
            attributes.set("width", w.to_string());
        }
        for (name, value) in extra.iter() {
            if !name.eq_ignore_ascii_case("src") {
                attributes.set(name, value);
            }
        }
        Self { attributes }
    }

    /// The image source.
    #[must_use]
    pub fn src(&self) -> &str {
        self.attributes.get("src").unwrap_or_default()
    }

    /// The `width` attribute, if set to a number.
    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.attributes.get("width")?.parse().ok()
    }

    /// The `height` attribute, if set to a number.
    #[must_use]
    pub fn height(&self) -> Option<u32> {
        self.attributes.get("height")?.parse().ok()
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// All attributes, `src` first.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Serialize as an HTML `<img>` tag.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::from("<img");
        for (name, value) in self.attributes.iter() {
            let _ = write!(out, " {name}=\"{}\"", escape_xml(value));
        }
        out.push('>');
        out
    }

    /// Create a detached `<img>` element for this handle in `document`.
    pub fn mount(&self, document: &mut Document) -> ElementId {
        let img = document.create_element("img");
        if let Some(element) = document.element_mut(img) {
            element.attributes = self.attributes.clone();
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_only_when_positive() {
        let handle = ImageHandle::new("data:,", Some(0), None, &Attributes::new());
        assert_eq!(handle.width(), None);
        assert_eq!(handle.height(), None);
        assert_eq!(handle.attributes().len(), 1);

        let handle = ImageHandle::new("data:,", Some(40), Some(30), &Attributes::new());
        assert_eq!(handle.width(), Some(40));
        assert_eq!(handle.height(), Some(30));
    }

    #[test]
    fn test_src_cannot_be_overridden() {
        let extra = Attributes::new()
            .with("src", "evil.png")
            .with("SRC", "evil.png")
            .with("Src", "evil.png")
            .with("alt", "A map");
        let handle = ImageHandle::new("data:image/png;base64,AAAA", None, None, &extra);
        assert_eq!(handle.src(), "data:image/png;base64,AAAA");
        assert_eq!(handle.attribute("SRC"), None);
        assert_eq!(handle.attribute("alt"), Some("A map"));
    }

    #[test]
    fn test_markup() {
        let extra = Attributes::new().with("class", "map").with("alt", "\"quoted\"");
        let handle = ImageHandle::new("data:,", Some(2), Some(1), &extra);
        assert_eq!(
            handle.to_markup(),
            "<img src=\"data:,\" height=\"1\" width=\"2\" class=\"map\" alt=\"&quot;quoted&quot;\">"
        );
    }

    #[test]
    fn test_mount_is_detached() {
        let mut doc = Document::new();
        let handle = ImageHandle::new("data:,", Some(2), Some(1), &Attributes::new());
        let img = handle.mount(&mut doc);
        assert!(!doc.is_connected(img));
        assert_eq!(doc.attribute(img, "src"), Some("data:,"));
        assert_eq!(doc.attribute(img, "width"), Some("2"));
    }
}
