//! The embedding environment that acts on link activation.
//!
//! A browser follows an activated `<a download>` by saving the linked
//! resource. [`Host`] is that seam: hosts may support native activation
//! (`click()`), and must accept synthesized events as the fallback.

use serde::{Deserialize, Serialize};

use crate::{Document, ElementId, MouseEvent};

/// Something that reacts to activated elements.
pub trait Host {
    /// Natively activate `target`.
    ///
    /// Returns `false` when the host has no native activation, in which
    /// case callers fall back to [`dispatch_event`](Self::dispatch_event).
    fn click(&mut self, document: &Document, target: ElementId) -> bool;

    /// Deliver a synthesized event to `target`.
    fn dispatch_event(&mut self, document: &Document, target: ElementId, event: &MouseEvent);
}

/// A file download requested by activating an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Linked resource, usually a data URI.
    pub href: String,
    /// Suggested file name from the `download` attribute.
    pub filename: String,
}

impl DownloadRequest {
    /// Read a download request off an `<a href download>` element.
    ///
    /// Returns `None` for anything that is not such an anchor.
    #[must_use]
    pub fn from_anchor(document: &Document, anchor: ElementId) -> Option<Self> {
        let element = document.element(anchor)?;
        if !element.tag.eq_ignore_ascii_case("a") {
            return None;
        }
        Some(Self {
            href: element.attribute("href")?.to_string(),
            filename: element.attribute("download")?.to_string(),
        })
    }
}

/// A host that records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    /// Whether [`Host::click`] is supported.
    pub native_click: bool,
    /// Downloads triggered so far.
    pub downloads: Vec<DownloadRequest>,
    /// Synthesized events received so far.
    pub events: Vec<MouseEvent>,
}

impl RecordingHost {
    /// A host with native click support.
    #[must_use]
    pub fn new() -> Self {
        Self {
            native_click: true,
            ..Self::default()
        }
    }

    /// A host that only understands synthesized events.
    #[must_use]
    pub fn without_native_click() -> Self {
        Self::default()
    }

    fn follow(&mut self, document: &Document, target: ElementId) {
        if let Some(request) = DownloadRequest::from_anchor(document, target) {
            tracing::debug!("Recorded download of {}", request.filename);
            self.downloads.push(request);
        }
    }
}

impl Host for RecordingHost {
    fn click(&mut self, document: &Document, target: ElementId) -> bool {
        if !self.native_click {
            return false;
        }
        self.follow(document, target);
        true
    }

    fn dispatch_event(&mut self, document: &Document, target: ElementId, event: &MouseEvent) {
        self.events.push(event.clone());
        if event.is_activation() {
            self.follow(document, target);
        }
    }
}
