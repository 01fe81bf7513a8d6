/// Normalized texture-space rectangle `{left, top, right, bottom}`.
///
/// Flipped rects (left > right or top > bottom) are valid and mirror the image.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct UvRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a rect from a pixel region of a texture of `tex_w` x `tex_h` pixels.
    #[inline]
    pub fn from_pixels(x: f32, y: f32, w: f32, h: f32, tex_w: f32, tex_h: f32) -> Self {
        let left = x / tex_w;
        let top = y / tex_h;
        Self::new(left, top, left + w / tex_w, top + h / tex_h)
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.bottom - self.top
    }

    /// Swaps left and right.
    #[inline]
    pub fn flip_horizontal(&mut self) {
        core::mem::swap(&mut self.left, &mut self.right);
    }

    /// Swaps top and bottom.
    #[inline]
    pub fn flip_vertical(&mut self) {
        core::mem::swap(&mut self.top, &mut self.bottom);
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pixels_normalizes() {
        let r = UvRect::from_pixels(16.0, 32.0, 16.0, 16.0, 64.0, 128.0);
        assert_eq!(r, UvRect::new(0.25, 0.25, 0.5, 0.375));
        assert_eq!(r.width(), 0.25);
        assert_eq!(r.height(), 0.125);
    }

    #[test]
    fn flips_are_involutions() {
        let original = UvRect::new(0.1, 0.2, 0.3, 0.4);
        let mut r = original;

        r.flip_horizontal();
        assert_eq!(r, UvRect::new(0.3, 0.2, 0.1, 0.4));
        r.flip_horizontal();
        assert_eq!(r, original);

        r.flip_vertical();
        assert_eq!(r, UvRect::new(0.1, 0.4, 0.3, 0.2));
        r.flip_vertical();
        assert_eq!(r, original);
    }
}
