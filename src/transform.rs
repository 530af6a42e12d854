//! In-place orientation changes applied to the rendered canvas.

use crate::bitmap::BitmapBgra;

/// One post-render orientation step.
///
/// Steps never allocate. When several are requested they run in
/// [`PostTransform::ORDER`]: transpose, then horizontal flip, then vertical flip.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostTransform {
    /// Swap rows and columns; a `w × h` bitmap becomes `h × w`.
    Transpose,
    /// Mirror left to right.
    FlipHorizontal,
    /// Mirror top to bottom.
    FlipVertical,
}

impl PostTransform {
    /// Fixed application order.
    pub const ORDER: [PostTransform; 3] = [
        PostTransform::Transpose,
        PostTransform::FlipHorizontal,
        PostTransform::FlipVertical,
    ];

    pub fn apply(self, bitmap: &mut BitmapBgra) {
        match self {
            PostTransform::Transpose => transpose(bitmap),
            PostTransform::FlipHorizontal => flip_horizontal(bitmap),
            PostTransform::FlipVertical => flip_vertical(bitmap),
        }
    }
}

fn flip_vertical(bitmap: &mut BitmapBgra) {
    let stride = bitmap.stride();
    let height = bitmap.height() as usize;
    let pixels = bitmap.pixels_mut();
    for y in 0..height / 2 {
        let (top, bottom) = pixels.split_at_mut((height - 1 - y) * stride);
        top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
    }
}

fn flip_horizontal(bitmap: &mut BitmapBgra) {
    let bpp = bitmap.bytes_per_pixel();
    for y in 0..bitmap.height() {
        let row = bitmap.row_mut(y);
        row.reverse();
        for px in row.chunks_exact_mut(bpp) {
            px.reverse();
        }
    }
}

/// Transpose the packed buffer by following permutation cycles.
///
/// Pixel `i = y·w + x` moves to `x·h + y`, which is `i·h mod (n - 1)` for
/// `n = w·h`. A cycle is rotated only from its smallest index.
fn transpose(bitmap: &mut BitmapBgra) {
    let bpp = bitmap.bytes_per_pixel();
    let h = u64::from(bitmap.height());
    let n = u64::from(bitmap.width()) * h;
    if n > 2 && bitmap.width() != 1 && bitmap.height() != 1 {
        let next = |i: u64| i * h % (n - 1);
        let pixels = bitmap.pixels_mut();
        let mut carry = [0u8; 4];
        for start in 1..n - 1 {
            let mut j = next(start);
            while j > start {
                j = next(j);
            }
            if j != start {
                continue;
            }
            let s = start as usize * bpp;
            carry[..bpp].copy_from_slice(&pixels[s..s + bpp]);
            let mut i = start;
            loop {
                i = next(i);
                let d = i as usize * bpp;
                carry[..bpp].swap_with_slice(&mut pixels[d..d + bpp]);
                if i == start {
                    break;
                }
            }
        }
    }
    bitmap.swap_dimensions();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;
    use crate::pixel::PixelFormat;

    fn numbered(width: u32, height: u32, format: PixelFormat) -> BitmapBgra {
        let mut ctx = Context::new();
        let mut b = ctx.create_bitmap_bgra(width, height, true, format).unwrap();
        for (i, v) in b.pixels_mut().iter_mut().enumerate() {
            *v = i as u8;
        }
        b
    }

    #[test]
    fn flip_vertical_swaps_rows() {
        let mut b = numbered(2, 3, PixelFormat::Gray8);
        PostTransform::FlipVertical.apply(&mut b);
        assert_eq!(b.pixels(), &[4, 5, 2, 3, 0, 1]);
    }

    #[test]
    fn flip_horizontal_keeps_channel_order() {
        let mut b = numbered(3, 1, PixelFormat::GrayAlpha8);
        PostTransform::FlipHorizontal.apply(&mut b);
        assert_eq!(b.pixels(), &[4, 5, 2, 3, 0, 1]);
    }

    #[test]
    fn transpose_rectangle() {
        // 3x2:      2x3:
        // 0 1 2     0 3
        // 3 4 5     1 4
        //           2 5
        let mut b = numbered(3, 2, PixelFormat::Gray8);
        PostTransform::Transpose.apply(&mut b);
        assert_eq!((b.width(), b.height(), b.stride()), (2, 3, 2));
        assert_eq!(b.pixels(), &[0, 3, 1, 4, 2, 5]);
    }

    #[test]
    fn transpose_moves_whole_pixels() {
        let mut b = numbered(2, 3, PixelFormat::Bgr24);
        let before: Vec<Vec<u8>> = (0..3)
            .flat_map(|y| (0..2).map(move |x| (x, y)))
            .map(|(x, y)| b.pixel(x, y).to_vec())
            .collect();
        PostTransform::Transpose.apply(&mut b);
        assert_eq!((b.width(), b.height()), (3, 2));
        for y in 0..3u32 {
            for x in 0..2u32 {
                assert_eq!(b.pixel(y, x), &before[(y * 2 + x) as usize][..]);
            }
        }
    }

    #[test]
    fn single_row_transpose_only_swaps_dimensions() {
        let mut b = numbered(4, 1, PixelFormat::Bgra32);
        let before = b.pixels().to_vec();
        PostTransform::Transpose.apply(&mut b);
        assert_eq!((b.width(), b.height()), (1, 4));
        assert_eq!(b.pixels(), &before[..]);
    }

    #[test]
    fn every_step_is_an_involution() {
        for (w, h) in [(1, 1), (5, 3), (4, 4), (7, 2), (13, 11)] {
            for step in PostTransform::ORDER {
                let mut b = numbered(w, h, PixelFormat::Bgra32);
                let before = b.pixels().to_vec();
                step.apply(&mut b);
                step.apply(&mut b);
                assert_eq!((b.width(), b.height()), (w, h), "{step:?}");
                assert_eq!(b.pixels(), &before[..], "{step:?} {w}x{h}");
            }
        }
    }
}
