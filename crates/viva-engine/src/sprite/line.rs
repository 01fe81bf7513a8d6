use crate::coords::{Color, Vec3};
use crate::render::SpriteUniform;

use super::SpriteFlags;

/// A debug line between two world points.
///
/// Endpoints live in sprite world space (camera applies, y points down). The `z`
/// of each endpoint is its depth. Lines cannot be rotated or scaled.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Line {
    pub a: Vec3,
    pub b: Vec3,
    pub color: Color,
    pub nodraw: bool,
}

impl Line {
    pub fn new(a: Vec3, b: Vec3, color: Color) -> Self {
        Self {
            a,
            b,
            color,
            nodraw: false,
        }
    }

    /// Packs the endpoints into the sprite record: A in `x,y,z`, B in `sx,sy,rot`.
    pub fn to_uniform(&self) -> SpriteUniform {
        let mut flags = SpriteFlags::LINE | SpriteFlags::NOTEXTURE;
        if self.nodraw {
            flags |= SpriteFlags::NODRAW;
        }
        SpriteUniform {
            x: self.a.x,
            y: self.a.y,
            z: self.a.z,
            sx: self.b.x,
            sy: self.b.y,
            rot: self.b.z,
            r: self.color.r,
            g: self.color.g,
            b: self.color.b,
            a: self.color.a,
            flags,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_pack_into_sprite_slots() {
        let line = Line::new(
            Vec3::new(1.0, 2.0, 0.1),
            Vec3::new(3.0, 4.0, 0.2),
            Color::new(1.0, 0.0, 0.0, 1.0),
        );
        let u = line.to_uniform();
        assert_eq!((u.x, u.y, u.z), (1.0, 2.0, 0.1));
        assert_eq!((u.sx, u.sy, u.rot), (3.0, 4.0, 0.2));
        assert_eq!(u.flags & SpriteFlags::LINE, SpriteFlags::LINE);
        assert_eq!(u.flags & SpriteFlags::NOTEXTURE, SpriteFlags::NOTEXTURE);
        assert_eq!(u.flags & SpriteFlags::NODRAW, 0);
    }
}
