//! Separable resampling of float bitmaps.

use crate::bitmap::BitmapFloat;
use crate::interpolation::LineContributions;

/// Resample every row of `src` to the width of `dst`. Heights must match.
pub(crate) fn scale_rows(src: &BitmapFloat, dst: &mut BitmapFloat, columns: &LineContributions) {
    debug_assert_eq!(src.height(), dst.height());
    debug_assert_eq!(src.channels(), dst.channels());
    debug_assert_eq!(columns.len(), dst.width() as usize);
    let ch = src.channels() as usize;

    for y in 0..src.height() {
        let input = src.row(y);
        let output = dst.row_mut(y);
        for (x, out) in output.chunks_exact_mut(ch).enumerate() {
            let (left, weights) = columns.get(x);
            out.fill(0.0);
            let span = &input[left * ch..(left + weights.len()) * ch];
            for (&w, px) in weights.iter().zip(span.chunks_exact(ch)) {
                for (o, &v) in out.iter_mut().zip(px) {
                    *o += w * v;
                }
            }
        }
    }
}

/// Resample the columns of `src` to the height of `dst`. Widths must match.
pub(crate) fn scale_columns(src: &BitmapFloat, dst: &mut BitmapFloat, rows: &LineContributions) {
    debug_assert_eq!(src.width(), dst.width());
    debug_assert_eq!(src.channels(), dst.channels());
    debug_assert_eq!(rows.len(), dst.height() as usize);

    for y in 0..dst.height() {
        let (top, weights) = rows.get(y as usize);
        let output = dst.row_mut(y);
        output.fill(0.0);
        for (i, &w) in weights.iter().enumerate() {
            let input = src.row((top + i) as u32);
            for (o, &v) in output.iter_mut().zip(input) {
                *o += w * v;
            }
        }
    }
}
