use crate::coords::UvRect;

/// Frame grid description for `uv_split`, all in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UvSplit {
    /// Where the first frame starts on the texture.
    pub offset_x: u32,
    pub offset_y: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub texture_width: u32,
    pub texture_height: u32,
    /// Frames per row before wrapping down.
    pub row_length: u32,
    pub frame_count: u32,
}

/// Computes `frame_count` UV rects walking a sprite sheet left to right, then down.
///
/// After `row_length` frames the cursor returns to `offset_x` and moves one frame
/// height down.
pub fn uv_split(info: &UvSplit) -> Vec<UvRect> {
    let tex_w = info.texture_width as f32;
    let tex_h = info.texture_height as f32;
    let width = info.frame_width as f32 / tex_w;
    let height = info.frame_height as f32 / tex_h;
    let offset_x = info.offset_x as f32 / tex_w;

    let mut x = offset_x;
    let mut y = info.offset_y as f32 / tex_h;
    let row_end = width * info.row_length as f32 + offset_x;

    let mut frames = Vec::with_capacity(info.frame_count as usize);
    for _ in 0..info.frame_count {
        frames.push(UvRect::new(x, y, x + width, y + height));

        x += width;
        if x >= row_end {
            x = offset_x;
            y += height;
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(row_length: u32) -> UvSplit {
        UvSplit {
            offset_x: 0,
            offset_y: 0,
            frame_width: 16,
            frame_height: 16,
            texture_width: 64,
            texture_height: 64,
            row_length,
            frame_count: 4,
        }
    }

    #[test]
    fn single_row_tiles_left_to_right() {
        let uv = uv_split(&sheet(4));
        assert_eq!(uv.len(), 4);
        for (i, r) in uv.iter().enumerate() {
            assert_eq!(r.left, i as f32 * 0.25);
            assert_eq!(r.right, (i + 1) as f32 * 0.25);
            assert_eq!(r.top, 0.0);
            assert_eq!(r.bottom, 0.25);
        }
    }

    #[test]
    fn short_rows_wrap_to_the_first_column() {
        let uv = uv_split(&sheet(2));
        assert_eq!(uv[0], UvRect::new(0.0, 0.0, 0.25, 0.25));
        assert_eq!(uv[1], UvRect::new(0.25, 0.0, 0.5, 0.25));
        assert_eq!(uv[2], UvRect::new(0.0, 0.25, 0.25, 0.5));
        assert_eq!(uv[3], UvRect::new(0.25, 0.25, 0.5, 0.5));
        assert_eq!(uv[2].left, uv[0].left);
    }

    #[test]
    fn offset_is_kept_on_wrap() {
        let info = UvSplit {
            offset_x: 32,
            offset_y: 16,
            ..sheet(1)
        };
        let uv = uv_split(&info);
        assert!(uv.iter().all(|r| r.left == 0.5));
        assert_eq!(uv[0].top, 0.25);
        assert_eq!(uv[1].top, 0.5);
    }
}
