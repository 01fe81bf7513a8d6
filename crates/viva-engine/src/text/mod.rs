//! Bitmap-font text built from glyph sprites.

mod error;
mod font;
mod text;

pub use error::{FontError, TextError};
pub use font::{Font, GLYPH_COUNT};
pub use text::Text;
