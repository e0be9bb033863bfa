//! Output image formats.

use serde::{Deserialize, Serialize};

/// Formats an element can be flattened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG with alpha support.
    #[default]
    Png,
    /// JPEG (no alpha).
    Jpg,
    /// WebP (lossless, alpha support).
    WebP,
}

impl ImageFormat {
    /// Normalize a caller-supplied format token.
    ///
    /// Accepts `png`, `jpg`, `jpeg` and `webp`, with an optional `image/`
    /// prefix, in any case. Anything else, or no token, means PNG.
    #[must_use]
    pub fn normalize(token: Option<&str>) -> Self {
        let Some(token) = token else {
            return Self::Png;
        };
        let lower = token.to_ascii_lowercase();
        match lower.strip_prefix("image/").unwrap_or(lower.as_str()) {
            "jpg" | "jpeg" => Self::Jpg,
            "webp" => Self::WebP,
            _ => Self::Png,
        }
    }

    /// Canonical token, also used as the file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// MIME type used in data URIs.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
