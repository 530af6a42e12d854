//! Separable gaussian unsharpening of float bitmaps.

use crate::bitmap::BitmapFloat;
use crate::context::Context;
use crate::error::RenderError;

const SHARPEN_STD_DEV: f64 = 1.0;
const SHARPEN_RADIUS: usize = 2;

fn gaussian(x: f64, std_dev: f64) -> f64 {
    (-x * x / (2.0 * std_dev * std_dev)).exp()
        / ((2.0 * core::f64::consts::PI).sqrt() * std_dev)
}

/// Odd-width 1-D convolution kernel centered on index `radius`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ConvolutionKernel {
    radius: usize,
    weights: Vec<f32>,
}

impl ConvolutionKernel {
    pub(crate) fn gaussian(std_dev: f64, radius: usize) -> Self {
        let weights = (0..=2 * radius)
            .map(|i| gaussian(i.abs_diff(radius) as f64, std_dev) as f32)
            .collect();
        Self { radius, weights }
    }

    /// Negated gaussian with the center lifted to `2 × sum - center`, normalized to 1.
    pub(crate) fn gaussian_sharpen(std_dev: f64, radius: usize) -> Self {
        let mut kernel = Self::gaussian(std_dev, radius);
        let sum = kernel.sum();
        for (i, w) in kernel.weights.iter_mut().enumerate() {
            if i == radius {
                *w = (2.0 * sum - f64::from(*w)) as f32;
            } else {
                *w = -*w;
            }
        }
        kernel.normalize(1.0);
        kernel
    }

    /// Mix with the identity kernel: `amount` 0 is identity, 1 is `self`.
    pub(crate) fn blended(&self, amount: f32) -> Self {
        let mut weights: Vec<f32> = self.weights.iter().map(|w| w * amount).collect();
        weights[self.radius] += 1.0 - amount;
        Self {
            radius: self.radius,
            weights,
        }
    }

    pub(crate) fn sum(&self) -> f64 {
        self.weights.iter().map(|&w| f64::from(w)).sum()
    }

    pub(crate) fn normalize(&mut self, desired_sum: f32) {
        let sum = self.sum();
        if sum == 0.0 {
            return;
        }
        let factor = (f64::from(desired_sum) / sum) as f32;
        for w in &mut self.weights {
            *w *= factor;
        }
    }

    #[cfg(test)]
    fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Convolve `len` pixels of `ch` samples from `input` into `output`.
    /// Taps falling outside the line are skipped and the rest renormalized.
    fn apply(&self, input: &[f32], output: &mut [f32], len: usize, ch: usize) {
        let r = self.radius;
        for x in 0..len {
            let lo = x.saturating_sub(r);
            let hi = (x + r).min(len - 1);
            let out = &mut output[x * ch..(x + 1) * ch];
            out.fill(0.0);
            let mut total = 0.0f32;
            for i in lo..=hi {
                let w = self.weights[i + r - x];
                total += w;
                for (o, &v) in out.iter_mut().zip(&input[i * ch..(i + 1) * ch]) {
                    *o += w * v;
                }
            }
            if total != 0.0 && total != 1.0 {
                for o in out.iter_mut() {
                    *o /= total;
                }
            }
        }
    }
}

/// Sharpen `bitmap` in place by `percent` (0 to 100; larger values extrapolate).
///
/// Rows are filtered first, then columns, through two scratch lines of
/// `max(width, height) × channels` floats allocated from `ctx`. Zero,
/// negative, and NaN percentages do nothing.
pub(crate) fn sharpen(
    ctx: &mut Context,
    bitmap: &mut BitmapFloat,
    percent: f32,
) -> Result<(), RenderError> {
    if percent.is_nan() || percent <= 0.0 {
        return Ok(());
    }
    let kernel = ConvolutionKernel::gaussian_sharpen(SHARPEN_STD_DEV, SHARPEN_RADIUS)
        .blended(percent / 100.0);

    let width = bitmap.width() as usize;
    let height = bitmap.height() as usize;
    let ch = bitmap.channels() as usize;
    let line_len = width.max(height) * ch;
    let mut scratch = ctx.calloc::<f32>(2 * line_len)?;
    let (line, column) = scratch.split_at_mut(line_len);

    for y in 0..bitmap.height() {
        let line = &mut line[..width * ch];
        line.copy_from_slice(bitmap.row(y));
        kernel.apply(line, bitmap.row_mut(y), width, ch);
    }

    let stride = bitmap.float_stride();
    let column = &mut column[..height * ch];
    for x in 0..width {
        let pixels = bitmap.pixels_mut();
        for (y, px) in column.chunks_exact_mut(ch).enumerate() {
            let start = y * stride + x * ch;
            px.copy_from_slice(&pixels[start..start + ch]);
        }
        let line = &mut line[..height * ch];
        kernel.apply(column, line, height, ch);
        for (y, px) in line.chunks_exact(ch).enumerate() {
            let start = y * stride + x * ch;
            pixels[start..start + ch].copy_from_slice(px);
        }
    }

    tracing::debug!(percent, width, height, "sharpened");
    Ok(())
}
