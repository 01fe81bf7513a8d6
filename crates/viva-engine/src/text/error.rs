use std::fmt;

use crate::texture::TextureError;

/// Failure to build or update a `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    ZeroCapacity,
    /// The font has no atlas texture to draw glyphs from.
    MissingFontTexture,
    CapacityExceeded { len: usize, capacity: usize },
    /// A control character other than `'\n'`, or one past the font's glyph table.
    UnsupportedChar(char),
}

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextError::ZeroCapacity => write!(f, "text capacity must be at least 1"),
            TextError::MissingFontTexture => write!(f, "font has no texture"),
            TextError::CapacityExceeded { len, capacity } => {
                write!(f, "text of {len} chars does not fit capacity {capacity}")
            }
            TextError::UnsupportedChar(c) => write!(f, "unsupported character {c:?}"),
        }
    }
}

impl std::error::Error for TextError {}

/// Failure to bake a font atlas.
#[derive(Debug)]
pub enum FontError {
    /// fontdue rejected the font data.
    InvalidFont(String),
    /// The font has no horizontal metrics at the requested size.
    MissingMetrics,
    Texture(TextureError),
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::InvalidFont(msg) => write!(f, "invalid font: {msg}"),
            FontError::MissingMetrics => write!(f, "font has no horizontal line metrics"),
            FontError::Texture(e) => write!(f, "failed to upload font atlas: {e}"),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::Texture(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TextureError> for FontError {
    fn from(e: TextureError) -> Self {
        FontError::Texture(e)
    }
}
