//! # Pancake Core
//!
//! The page model Pancake flattens images out of.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                pancake-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Host                    │
//! │  - Elements      │  - Native click          │
//! │  - Attributes    │  - Synthesized events    │
//! │  - Hierarchy     │  - Download requests     │
//! ├─────────────────────────────────────────────┤
//! │  Surface         │  Markup                  │
//! │  - RGBA pixels   │  - Serialization         │
//! │  - Canvas state  │  - HTML import           │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attributes;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod host;
pub mod html;
pub mod surface;

pub use attributes::Attributes;
pub use document::Document;
pub use element::{Element, ElementId, ElementKind, LayoutSize};
pub use error::{DocumentError, DocumentResult};
pub use event::{MouseButton, MouseEvent};
pub use host::{DownloadRequest, Host, RecordingHost};
pub use surface::Surface;

/// Pancake core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
