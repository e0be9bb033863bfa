//! Saving downloads to disk.

use std::path::{Path, PathBuf};

use pancake_core::{Document, DownloadRequest, ElementId, Host, MouseEvent};

use crate::data_uri;
use crate::error::{RenderError, RenderResult};

/// A [`Host`] that saves anchor downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectoryHost {
    /// Save downloads into `dir`, which must already exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far.
    #[must_use]
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Decode a download request and write it out.
    ///
    /// # Errors
    ///
    /// Returns an error if the href is not a data URI, the filename has no
    /// usable final component, or the write fails.
    pub fn save(&mut self, request: &DownloadRequest) -> RenderResult<PathBuf> {
        let data = data_uri::decode(&request.href)?;
        let name = Path::new(&request.filename)
            .file_name()
            .ok_or_else(|| {
                RenderError::Resource(format!("unusable download name {:?}", request.filename))
            })?;
        let path = self.dir.join(name);
        std::fs::write(&path, &data.bytes)?;

        tracing::debug!("Saved {} bytes of {} to {}", data.bytes.len(), data.mime, path.display());
        self.saved.push(path.clone());
        Ok(path)
    }

    fn follow(&mut self, document: &Document, target: ElementId) {
        let Some(request) = DownloadRequest::from_anchor(document, target) else {
            return;
        };
        if let Err(e) = self.save(&request) {
            tracing::warn!("Download of {} failed: {e}", request.filename);
        }
    }
}

impl Host for DirectoryHost {
    fn click(&mut self, document: &Document, target: ElementId) -> bool {
        self.follow(document, target);
        true
    }

    fn dispatch_event(&mut self, document: &Document, target: ElementId, event: &MouseEvent) {
        if event.is_activation() {
            self.follow(document, target);
        }
    }
}
