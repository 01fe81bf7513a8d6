use std::rc::Rc;

use crate::coords::Color;
use crate::sprite::Sprite;

use super::{Font, TextError};

/// A fixed-capacity line of glyph sprites.
///
/// Sprite 0 is the anchor: its position, scale and origin drive the layout of
/// every other slot. Changing the string (or the anchor) takes effect on the next
/// `update()`.
#[derive(Debug, Clone)]
pub struct Text {
    font: Rc<Font>,
    sprites: Vec<Sprite>,
    string: String,
    pub horizontal_space: f32,
    pub vertical_space: f32,
}

impl Text {
    /// Allocates `capacity` black glyph sprites on the font's atlas and lays out `string`.
    pub fn new(font: Rc<Font>, capacity: usize, string: &str) -> Result<Self, TextError> {
        if capacity == 0 {
            return Err(TextError::ZeroCapacity);
        }
        let texture = font.texture().ok_or(TextError::MissingFontTexture)?.id;
        validate(string, capacity)?;

        let mut glyph = Sprite::new(Some(texture));
        glyph.set_color(Color::BLACK);

        let mut text = Self {
            font,
            sprites: vec![glyph; capacity],
            string: string.to_owned(),
            horizontal_space: 0.0,
            vertical_space: 0.0,
        };
        text.update();
        Ok(text)
    }

    /// Replaces the string. Nothing moves until `update()`.
    pub fn set(&mut self, string: &str) -> Result<(), TextError> {
        validate(string, self.capacity())?;
        self.string.clear();
        self.string.push_str(string);
        Ok(())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.string
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.sprites.len()
    }

    #[inline]
    pub fn font(&self) -> &Rc<Font> {
        &self.font
    }

    #[inline]
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// The anchor sprite, for positioning and sizing the whole text.
    #[inline]
    pub fn anchor_mut(&mut self) -> &mut Sprite {
        &mut self.sprites[0]
    }

    /// Every glyph sprite. Layout overwrites position, scale, origin and UV.
    #[inline]
    pub fn sprites_mut(&mut self) -> &mut [Sprite] {
        &mut self.sprites
    }

    /// Lays the string out from the anchor, left to right and down on `'\n'`.
    ///
    /// Slots past the end of the string are hidden.
    pub fn update(&mut self) {
        let anchor = self.sprites[0];
        let advance = anchor.sx + self.horizontal_space;
        let line_height = anchor.sy + self.vertical_space;
        let (mut x, mut y) = (anchor.x, anchor.y);

        let mut chars = self.string.chars();
        for slot in &mut self.sprites {
            match chars.next() {
                None => slot.nodraw = true,
                Some('\n') => {
                    x = anchor.x;
                    y += line_height;
                    slot.nodraw = true;
                    slot.sx = 0.0;
                    slot.sy = 0.0;
                }
                Some(c) => {
                    if let Some(uv) = self.font.uv(c) {
                        slot.set_uv(uv);
                    }
                    slot.x = x;
                    slot.y = y;
                    slot.set_scale(anchor.scale());
                    slot.set_origin(anchor.origin());
                    slot.nodraw = false;
                    x += advance;
                }
            }
        }
    }
}

fn validate(string: &str, capacity: usize) -> Result<(), TextError> {
    let len = string.chars().count();
    if len > capacity {
        return Err(TextError::CapacityExceeded { len, capacity });
    }
    match string
        .chars()
        .find(|c| *c != '\n' && Font::glyph_index(*c).is_none())
    {
        Some(c) => Err(TextError::UnsupportedChar(c)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::UvRect;
    use crate::render::TextureId;
    use crate::texture::Texture;

    fn font() -> Rc<Font> {
        let mut uv = [UvRect::default(); crate::text::GLYPH_COUNT];
        for (i, slot) in uv.iter_mut().enumerate() {
            let l = i as f32 / 256.0;
            *slot = UvRect::new(l, 0.0, l + 1.0 / 256.0, 1.0);
        }
        let texture = Texture {
            id: TextureId(7),
            width: 256,
            height: 1,
            index: 0,
        };
        Rc::new(Font::from_table(Some(texture), uv))
    }

    #[test]
    fn rejects_bad_construction() {
        assert_eq!(Text::new(font(), 0, "").unwrap_err(), TextError::ZeroCapacity);

        let bare = Rc::new(Font::from_table(None, [UvRect::default(); 256]));
        assert_eq!(
            Text::new(bare, 4, "a").unwrap_err(),
            TextError::MissingFontTexture
        );

        assert_eq!(
            Text::new(font(), 2, "abc").unwrap_err(),
            TextError::CapacityExceeded { len: 3, capacity: 2 }
        );
        assert_eq!(
            Text::new(font(), 4, "a\tb").unwrap_err(),
            TextError::UnsupportedChar('\t')
        );
    }

    #[test]
    fn glyphs_start_black_on_the_font_texture() {
        let t = Text::new(font(), 3, "").unwrap();
        for s in t.sprites() {
            assert_eq!(s.color(), Color::BLACK);
            assert_eq!(s.texture.id(), Some(TextureId(7)));
        }
    }

    #[test]
    fn full_capacity_fits_without_terminator() {
        let t = Text::new(font(), 3, "abc").unwrap();
        assert!(t.sprites().iter().all(|s| !s.nodraw));
    }

    #[test]
    fn newline_layout() {
        let mut t = Text::new(font(), 6, "").unwrap();
        {
            let a = t.anchor_mut();
            a.x = 1.0;
            a.y = 2.0;
            a.sx = 0.5;
            a.sy = 0.75;
        }
        t.horizontal_space = 0.1;
        t.vertical_space = 0.05;
        t.set("ab\ncd").unwrap();
        t.update();

        let s = t.sprites();
        let f = font();

        assert!(!s[0].nodraw);
        assert_eq!(s[0].uv(), f.uv('a').unwrap());
        assert_eq!((s[0].x, s[0].y), (1.0, 2.0));

        assert!(!s[1].nodraw);
        assert_eq!(s[1].uv(), f.uv('b').unwrap());
        assert!((s[1].x - 1.6).abs() < 1e-6);
        assert_eq!(s[1].scale(), s[0].scale());

        assert!(s[2].nodraw);
        assert_eq!((s[2].sx, s[2].sy), (0.0, 0.0));

        assert!(!s[3].nodraw);
        assert_eq!(s[3].uv(), f.uv('c').unwrap());
        assert_eq!(s[3].x, 1.0);
        assert!((s[3].y - 2.8).abs() < 1e-6);

        assert!(!s[4].nodraw);
        assert_eq!(s[4].uv(), f.uv('d').unwrap());

        assert!(s[5].nodraw);
    }

    #[test]
    fn shrinking_hides_stale_glyphs() {
        let mut t = Text::new(font(), 10, "0123456789").unwrap();
        assert!(t.sprites().iter().all(|s| !s.nodraw));

        t.set("abc").unwrap();
        t.update();
        let s = t.sprites();
        assert!(s[..3].iter().all(|s| !s.nodraw));
        assert!(s[3..].iter().all(|s| s.nodraw));
    }

    #[test]
    fn set_is_validated_before_applying() {
        let mut t = Text::new(font(), 2, "ok").unwrap();
        assert!(t.set("too long").is_err());
        assert_eq!(t.as_str(), "ok");
    }
}
