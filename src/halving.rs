//! Integer box downscale, used ahead of interpolation to cut its cost.

use crate::bitmap::BitmapBgra;
use crate::context::Context;
use crate::error::RenderError;

/// Largest supported divisor; keeps `divisor² × 255` within a `u16` accumulator.
pub const MAX_HALVING_DIVISOR: u32 = 16;

/// Box-downsample `src` by `divisor` in both directions.
///
/// Trailing rows and columns that do not fill a whole block are dropped. The
/// intermediate bitmap is allocated first, then a `u16` accumulator of
/// `(width / divisor) × bytes_per_pixel` samples, both through `ctx`.
pub(crate) fn halve(
    ctx: &mut Context,
    src: &BitmapBgra,
    divisor: u32,
) -> Result<BitmapBgra, RenderError> {
    let (width, height) = match divisor {
        1..=MAX_HALVING_DIVISOR => (src.width() / divisor, src.height() / divisor),
        _ => (0, 0),
    };
    if width == 0 || height == 0 {
        return Err(ctx.record(RenderError::dimensions(
            width,
            height,
            "halving divisor produces an empty or unsupported intermediate",
        )));
    }

    let mut dst = ctx.create_bitmap_bgra(width, height, true, src.format())?;
    dst.set_alpha_meaningful(src.alpha_meaningful());

    let bpp = src.bytes_per_pixel();
    let d = divisor as usize;
    let mut sums = ctx.calloc::<u16>(width as usize * bpp)?;
    let area = divisor * divisor;
    let half = area / 2;

    for y in 0..height {
        sums.fill(0);
        for sy in y * divisor..(y + 1) * divisor {
            let row = src.row(sy);
            for (x, acc) in sums.chunks_exact_mut(bpp).enumerate() {
                let start = x * d * bpp;
                for px in row[start..start + d * bpp].chunks_exact(bpp) {
                    for (a, &v) in acc.iter_mut().zip(px) {
                        *a += u16::from(v);
                    }
                }
            }
        }
        for (out, &sum) in dst.row_mut(y).iter_mut().zip(sums.iter()) {
            *out = ((u32::from(sum) + half) / area) as u8;
        }
    }

    tracing::debug!(divisor, width, height, "halved source");
    Ok(dst)
}
