use crate::coords::UvRect;
use crate::render::Renderer;
use crate::texture::Texture;

use super::FontError;

/// Entries in a font's UV table.
pub const GLYPH_COUNT: usize = 256;

/// Characters rasterised by `Font::bake`.
const BAKED: std::ops::RangeInclusive<char> = ' '..='~';
const ATLAS_COLUMNS: u32 = 16;

/// A glyph atlas: one texture plus a UV rect per character, indexed by `c - ' '`.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    texture: Option<Texture>,
    uv: [UvRect; GLYPH_COUNT],
}

impl Font {
    /// Wraps a prebuilt atlas.
    pub fn from_table(texture: Option<Texture>, uv: [UvRect; GLYPH_COUNT]) -> Self {
        Self { texture, uv }
    }

    #[inline]
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    #[inline]
    pub fn table(&self) -> &[UvRect; GLYPH_COUNT] {
        &self.uv
    }

    /// Table slot of `c`, if it has one.
    pub fn glyph_index(c: char) -> Option<usize> {
        (c as u32)
            .checked_sub(' ' as u32)
            .map(|i| i as usize)
            .filter(|i| *i < GLYPH_COUNT)
    }

    pub fn uv(&self, c: char) -> Option<UvRect> {
        Self::glyph_index(c).map(|i| self.uv[i])
    }

    /// Rasterises printable ASCII at `px` pixels into a new atlas texture.
    ///
    /// Glyphs sit on a common baseline inside equal cells, so a `Text` can place
    /// them at a fixed advance. The atlas texture belongs to the caller.
    pub fn bake(renderer: &mut Renderer<'_>, data: &[u8], px: f32) -> Result<Font, FontError> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| FontError::InvalidFont(e.to_string()))?;
        let line = font
            .horizontal_line_metrics(px)
            .ok_or(FontError::MissingMetrics)?;

        let cell_w = BAKED
            .clone()
            .map(|c| font.metrics(c, px).advance_width)
            .fold(1.0f32, f32::max)
            .ceil() as u32;
        let cell_h = (line.ascent - line.descent).ceil().max(1.0) as u32;
        let layout = AtlasLayout::new(cell_w, cell_h);

        let mut rgba = vec![0u8; layout.width as usize * layout.height as usize * 4];
        for c in BAKED {
            let Some((cx, cy)) = layout.cell_origin(c) else { continue };
            let (metrics, coverage) = font.rasterize(c, px);

            let left = cx as i32 + metrics.xmin.max(0);
            let baseline = line.ascent.round() as i32;
            let top = cy as i32 + (baseline - metrics.ymin - metrics.height as i32);
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let x = left + col as i32;
                    let y = top + row as i32;
                    if x < cx as i32
                        || y < cy as i32
                        || x >= (cx + cell_w) as i32
                        || y >= (cy + cell_h) as i32
                    {
                        continue;
                    }
                    let i = (y as usize * layout.width as usize + x as usize) * 4;
                    rgba[i..i + 3].fill(255);
                    rgba[i + 3] = coverage[row * metrics.width + col];
                }
            }
        }

        let texture = renderer.create_texture_from_bytes(layout.width, layout.height, &rgba)?;
        log::debug!(
            "baked font atlas {}x{} ({px}px, {cell_w}x{cell_h} cells)",
            layout.width,
            layout.height
        );

        Ok(Font {
            texture: Some(texture),
            uv: layout.table(),
        })
    }
}

/// Grid placement of the baked glyph cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct AtlasLayout {
    cell_w: u32,
    cell_h: u32,
    width: u32,
    height: u32,
}

impl AtlasLayout {
    fn new(cell_w: u32, cell_h: u32) -> Self {
        let count = BAKED.count() as u32;
        let rows = count.div_ceil(ATLAS_COLUMNS);
        Self {
            cell_w,
            cell_h,
            width: cell_w * ATLAS_COLUMNS,
            height: cell_h * rows,
        }
    }

    fn cell_origin(&self, c: char) -> Option<(u32, u32)> {
        if !BAKED.contains(&c) {
            return None;
        }
        let i = c as u32 - ' ' as u32;
        Some((
            (i % ATLAS_COLUMNS) * self.cell_w,
            (i / ATLAS_COLUMNS) * self.cell_h,
        ))
    }

    fn table(&self) -> [UvRect; GLYPH_COUNT] {
        let mut uv = [UvRect::default(); GLYPH_COUNT];
        for c in BAKED {
            if let (Some((x, y)), Some(slot)) = (self.cell_origin(c), Font::glyph_index(c)) {
                uv[slot] = UvRect::from_pixels(
                    x as f32,
                    y as f32,
                    self.cell_w as f32,
                    self.cell_h as f32,
                    self.width as f32,
                    self.height as f32,
                );
            }
        }
        uv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_index_is_offset_from_space() {
        assert_eq!(Font::glyph_index(' '), Some(0));
        assert_eq!(Font::glyph_index('A'), Some(33));
        assert_eq!(Font::glyph_index('\n'), None);
        assert_eq!(Font::glyph_index('\u{11f}'), Some(255));
        assert_eq!(Font::glyph_index('\u{120}'), None);
    }

    #[test]
    fn atlas_is_sixteen_cells_wide() {
        let layout = AtlasLayout::new(10, 20);
        assert_eq!(layout.width, 160);
        // 95 printable characters need six rows.
        assert_eq!(layout.height, 120);
        assert_eq!(layout.cell_origin(' '), Some((0, 0)));
        assert_eq!(layout.cell_origin('0'), Some((0, 20)));
        assert_eq!(layout.cell_origin('~'), Some((140, 100)));
        assert_eq!(layout.cell_origin('\u{7f}'), None);
    }

    #[test]
    fn table_covers_printable_ascii_only() {
        let table = AtlasLayout::new(10, 20).table();
        let a = table[Font::glyph_index('!').unwrap()];
        assert_eq!(a, UvRect::new(1.0 / 16.0, 0.0, 2.0 / 16.0, 1.0 / 6.0));
        assert_eq!(table[200], UvRect::default());
    }

    #[test]
    fn garbage_is_not_a_font() {
        let (mut r, log) = Renderer::headless(64, 64);
        let err = Font::bake(&mut r, b"definitely not a font", 16.0).unwrap_err();
        assert!(matches!(err, FontError::InvalidFont(_)));
        assert!(log.live_textures().is_empty());
    }
}
