use std::fmt;
use std::path::PathBuf;

use crate::render::RenderError;

/// Failure to turn an image source into a GPU texture.
#[derive(Debug)]
pub enum TextureError {
    Io { path: PathBuf, source: std::io::Error },
    Decode(image::ImageError),
    Render(RenderError),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            TextureError::Decode(e) => write!(f, "failed to decode image: {e}"),
            TextureError::Render(e) => write!(f, "failed to create texture: {e}"),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Io { source, .. } => Some(source),
            TextureError::Decode(e) => Some(e),
            TextureError::Render(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::Decode(e)
    }
}

impl From<RenderError> for TextureError {
    fn from(e: RenderError) -> Self {
        TextureError::Render(e)
    }
}
