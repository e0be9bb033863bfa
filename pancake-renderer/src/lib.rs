//! # Pancake Renderer
//!
//! Flattens `<svg>` and `<canvas>` elements out to PNG, JPEG or WebP.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Converter                   │
//! ├──────────────┬──────────────┬───────────────┤
//! │ Rasterizer   │ Encoder      │ ImageHandle   │
//! │ (resvg)      │ (image)      │ replace()     │
//! │ svg → pixels │ pixels → URI │ download()    │
//! └──────────────┴──────────────┴───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use pancake_core::{Document, RecordingHost};
//! use pancake_renderer::{ConvertOptions, Converter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::from_html(
//!     r#"<body><svg id="chart1" width="200" height="100"></svg></body>"#,
//! )?;
//! let flat = Converter::new(&mut doc, "chart1", ConvertOptions::default().with_format("jpg"))?;
//! println!("{}", flat.image().to_markup());
//!
//! let mut host = RecordingHost::new();
//! flat.replace(&mut doc, "chart1")?.download(&mut doc, &mut host, None);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod converter;
pub mod data_uri;
pub mod download;
pub mod encode;
pub mod error;
pub mod format;
pub mod handle;
pub mod raster;

pub use converter::{ConvertOptions, Converter, Source};
pub use download::DirectoryHost;
pub use encode::{EncodeConfig, SurfaceEncoder};
pub use error::{RenderError, RenderResult};
pub use format::ImageFormat;
pub use handle::ImageHandle;
pub use raster::{RasterOptions, Rasterizer, ResvgRasterizer};
