use crate::coords::{Color, UvRect, Vec2, Vec3};
use crate::render::{Camera, SpriteUniform, TextureId};

/// Bits of `SpriteUniform::flags`.
pub struct SpriteFlags;

impl SpriteFlags {
    pub const NODRAW: u32 = 1;
    pub const NOTEXTURE: u32 = 2;
    pub const LINE: u32 = 4;
}

/// What a sprite samples from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpriteTexture {
    Textured(TextureId),
    /// Nothing to draw; the renderer skips the sprite entirely.
    Untextured,
    /// Flat quad in the sprite color.
    SolidColor,
}

impl SpriteTexture {
    #[inline]
    pub fn id(self) -> Option<TextureId> {
        match self {
            SpriteTexture::Textured(id) => Some(id),
            _ => None,
        }
    }
}

impl From<Option<TextureId>> for SpriteTexture {
    fn from(t: Option<TextureId>) -> Self {
        t.map_or(SpriteTexture::SolidColor, SpriteTexture::Textured)
    }
}

/// A textured, colored, transformed unit quad.
///
/// Fields are laid out in the order the sprite shader reads them. Units are world
/// units: at camera scale 1 the window spans `2 * aspect` horizontally and 2
/// vertically, with +y pointing down.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    /// Depth in 0..1; smaller is nearer.
    pub z: f32,
    pub sx: f32,
    pub sy: f32,
    /// Radians.
    pub rot: f32,
    /// Pivot offset in local (pre-scale) quad units.
    pub ox: f32,
    pub oy: f32,

    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,

    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,

    pub nodraw: bool,
    pub texture: SpriteTexture,
}

impl Sprite {
    /// A visible sprite: identity transform with unit scale, full UV, opaque white.
    ///
    /// `None` yields a solid-color sprite. Unit scale covers half the window height;
    /// use the renderer's pixel helpers to size it in pixels.
    pub fn new(texture: Option<TextureId>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            sx: 1.0,
            sy: 1.0,
            rot: 0.0,
            ox: 0.0,
            oy: 0.0,
            left: 0.0,
            top: 0.0,
            right: 1.0,
            bottom: 1.0,
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
            nodraw: false,
            texture: texture.into(),
        }
    }

    /// Whether the renderer would submit this sprite.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        !self.nodraw && self.texture != SpriteTexture::Untextured
    }

    // ── grouped views ─────────────────────────────────────────────────────

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn set_position(&mut self, p: Vec3) {
        self.x = p.x;
        self.y = p.y;
        self.z = p.z;
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        Vec2::new(self.sx, self.sy)
    }

    #[inline]
    pub fn set_scale(&mut self, s: Vec2) {
        self.sx = s.x;
        self.sy = s.y;
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.ox, self.oy)
    }

    #[inline]
    pub fn set_origin(&mut self, o: Vec2) {
        self.ox = o.x;
        self.oy = o.y;
    }

    #[inline]
    pub fn uv(&self) -> UvRect {
        UvRect::new(self.left, self.top, self.right, self.bottom)
    }

    #[inline]
    pub fn set_uv(&mut self, uv: UvRect) {
        self.left = uv.left;
        self.top = uv.top;
        self.right = uv.right;
        self.bottom = uv.bottom;
    }

    #[inline]
    pub fn color(&self) -> Color {
        Color::new(self.r, self.g, self.b, self.a)
    }

    #[inline]
    pub fn set_color(&mut self, c: Color) {
        self.r = c.r;
        self.g = c.g;
        self.b = c.b;
        self.a = c.a;
    }

    /// Selects a pixel region of a `tex_w` x `tex_h` texture.
    pub fn set_uv_from_pixels(&mut self, x: f32, y: f32, w: f32, h: f32, tex_w: f32, tex_h: f32) {
        self.set_uv(UvRect::from_pixels(x, y, w, h, tex_w, tex_h));
    }

    // ── GPU payload ───────────────────────────────────────────────────────

    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.nodraw {
            flags |= SpriteFlags::NODRAW;
        }
        if !matches!(self.texture, SpriteTexture::Textured(_)) {
            flags |= SpriteFlags::NOTEXTURE;
        }
        flags
    }

    pub fn to_uniform(&self) -> SpriteUniform {
        SpriteUniform {
            x: self.x,
            y: self.y,
            z: self.z,
            sx: self.sx,
            sy: self.sy,
            rot: self.rot,
            ox: self.ox,
            oy: self.oy,
            left: self.left,
            top: self.top,
            right: self.right,
            bottom: self.bottom,
            r: self.r,
            g: self.g,
            b: self.b,
            a: self.a,
            flags: self.flags(),
            _pad: [0; 3],
        }
    }

    /// CPU mirror of the sprite vertex shader's 2D transform.
    ///
    /// `camera * translate(x, -y) * rotate(rot) * scale(sx, sy) * translate(-ox, oy)`,
    /// applied to the unit quad spanning [-0.5, 0.5]. Depth is not included.
    pub fn world_matrix(&self, camera: &Camera) -> glam::Mat4 {
        use glam::{Mat4, Vec3 as GVec3};

        let loc = Mat4::from_translation(GVec3::new(self.x, -self.y, 0.0));
        // Row-major [[c, s], [-s, c]]: a clockwise rotation in y-up space.
        let rot = Mat4::from_rotation_z(-self.rot);
        let sca = Mat4::from_scale(GVec3::new(self.sx, self.sy, 1.0));
        let ori = Mat4::from_translation(GVec3::new(-self.ox, self.oy, 0.0));

        camera.matrix() * loc * rot * sca * ori
    }

    /// Clip-space position of a local quad corner (`-0.5..=0.5` on each axis).
    pub fn project(&self, camera: &Camera, local: Vec2) -> Vec2 {
        let p = self
            .world_matrix(camera)
            .transform_point3(glam::Vec3::new(local.x, local.y, 0.0));
        Vec2::new(p.x, p.y)
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new(None)
    }
}
