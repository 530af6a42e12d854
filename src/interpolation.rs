//! Resampling filters and the per-pixel weight tables built from them.

use core::f64::consts::PI;

use crate::context::Context;
use crate::error::RenderError;

/// Named resampling filters.
///
/// The cubic family is parameterized by Mitchell–Netravali B and C; the
/// Lanczos family is sinc windowed by sinc. "Sharp" variants shrink the blur
/// factor slightly, "Fast" variants shrink the window.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Filter {
    RobidouxFast,
    Robidoux,
    RobidouxSharp,
    Lanczos,
    LanczosSharp,
    Lanczos2,
    Lanczos2Sharp,
    CubicFast,
    Cubic,
    CubicSharp,
    CatmullRom,
    CatmullRomFast,
    CatmullRomFastSharp,
    Mitchell,
    MitchellFast,
    NCubic,
    NCubicSharp,
    CubicBSpline,
    Hermite,
    RawLanczos3,
    RawLanczos3Sharp,
    RawLanczos2,
    RawLanczos2Sharp,
    Triangle,
    Linear,
    Box,
    Fastest,
}

const SHARP_BLUR_2: f64 = 0.954_996_363_978_548_5;
const SHARP_BLUR_3: f64 = 0.981_250_564_426_935_6;
const ROBIDOUX_B: f64 = 0.378_215_755_093_998_67;
const ROBIDOUX_C: f64 = 0.310_892_122_453_000_67;
const ROBIDOUX_SHARP_B: f64 = 0.262_014_512_399_014_2;
const ROBIDOUX_SHARP_C: f64 = 0.368_992_743_800_492_9;

/// Offset keeping window sizes stable against floating-point noise.
const TONY: f64 = 0.00001;

/// Weights at or below this magnitude are flushed to zero so results are
/// reproducible across platforms.
const WEIGHT_EPSILON: f64 = 0.000_000_02;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Kernel {
    /// Piecewise cubic with precomputed B/C coefficients.
    FlexCubic {
        p1: f64,
        p2: f64,
        p3: f64,
        q1: f64,
        q2: f64,
        q3: f64,
        q4: f64,
    },
    BicubicFast,
    Sinc,
    SincWindowed,
    Box,
    Triangle,
}

impl Kernel {
    fn cubic(b: f64, c: f64) -> Self {
        let bx2 = b + b;
        Kernel::FlexCubic {
            p1: 1.0 - (1.0 / 3.0) * b,
            p2: -3.0 + bx2 + c,
            p3: 2.0 - 1.5 * b - c,
            q1: (4.0 / 3.0) * b + 4.0 * c,
            q2: -8.0 * c - bx2,
            q3: b + 5.0 * c,
            q4: (-1.0 / 6.0) * b - c,
        }
    }
}

/// A filter function together with its support window and blur factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolationDetails {
    /// Half-width of the filter support, in source pixels at scale 1.
    pub window: f64,
    /// Stretch applied to the filter input; values below 1 sharpen.
    pub blur: f64,
    kernel: Kernel,
}

impl Default for InterpolationDetails {
    fn default() -> Self {
        Self::create(Filter::Robidoux)
    }
}

impl InterpolationDetails {
    /// Window, blur, and kernel for a named filter.
    pub fn create(filter: Filter) -> Self {
        use Filter::*;
        match filter {
            RobidouxFast => Self::bicubic_custom(1.05, 1.0, ROBIDOUX_B, ROBIDOUX_C),
            Robidoux => Self::bicubic_custom(2.0, 1.0, ROBIDOUX_B, ROBIDOUX_C),
            RobidouxSharp => Self::bicubic_custom(2.0, 1.0, ROBIDOUX_SHARP_B, ROBIDOUX_SHARP_C),
            Fastest => Self::bicubic_custom(0.74, 0.74, ROBIDOUX_B, ROBIDOUX_C),
            NCubic => Self::bicubic_custom(
                2.5,
                1.0 / 1.168_577_762_083_693_2,
                ROBIDOUX_B,
                ROBIDOUX_C,
            ),
            NCubicSharp => Self::bicubic_custom(
                2.5,
                1.0 / 1.105_822_933_719_019,
                ROBIDOUX_SHARP_B,
                ROBIDOUX_SHARP_C,
            ),
            Lanczos => Self::custom(3.0, 1.0, Kernel::SincWindowed),
            LanczosSharp => Self::custom(3.0, SHARP_BLUR_3, Kernel::SincWindowed),
            Lanczos2 => Self::custom(2.0, 1.0, Kernel::SincWindowed),
            Lanczos2Sharp => Self::custom(2.0, SHARP_BLUR_2, Kernel::SincWindowed),
            RawLanczos3 => Self::custom(3.0, 1.0, Kernel::Sinc),
            RawLanczos3Sharp => Self::custom(3.0, SHARP_BLUR_3, Kernel::Sinc),
            RawLanczos2 => Self::custom(2.0, 1.0, Kernel::Sinc),
            RawLanczos2Sharp => Self::custom(2.0, SHARP_BLUR_2, Kernel::Sinc),
            CubicFast => Self::custom(2.0, 1.0, Kernel::BicubicFast),
            Cubic => Self::bicubic_custom(2.0, 1.0, 0.0, 1.0),
            CubicSharp => Self::bicubic_custom(2.0, SHARP_BLUR_2, 0.0, 1.0),
            CatmullRom => Self::bicubic_custom(2.0, 1.0, 0.0, 0.5),
            CatmullRomFast => Self::bicubic_custom(1.0, 1.0, 0.0, 0.5),
            CatmullRomFastSharp => Self::bicubic_custom(1.0, 13.0 / 16.0, 0.0, 0.5),
            Mitchell => Self::bicubic_custom(2.0, 1.0, 1.0 / 3.0, 1.0 / 3.0),
            MitchellFast => Self::bicubic_custom(1.0, 1.0, 1.0 / 3.0, 1.0 / 3.0),
            CubicBSpline => Self::bicubic_custom(2.0, 1.0, 1.0, 0.0),
            Hermite => Self::bicubic_custom(1.0, 1.0, 0.0, 0.0),
            Triangle | Linear => Self::custom(1.0, 1.0, Kernel::Triangle),
            Box => Self::custom(0.5, 1.0, Kernel::Box),
        }
    }

    /// Cubic filter with explicit Mitchell–Netravali `b` and `c`.
    pub fn bicubic_custom(window: f64, blur: f64, b: f64, c: f64) -> Self {
        Self::custom(window, blur, Kernel::cubic(b, c))
    }

    fn custom(window: f64, blur: f64, kernel: Kernel) -> Self {
        Self {
            window,
            blur,
            kernel,
        }
    }

    /// Filter weight at distance `t` (in source pixels) from the sample center.
    pub fn filter(&self, t: f64) -> f64 {
        match self.kernel {
            Kernel::FlexCubic {
                p1,
                p2,
                p3,
                q1,
                q2,
                q3,
                q4,
            } => {
                let x = t.abs() / self.blur;
                if x < 1.0 {
                    p1 + x * (x * (p2 + x * p3))
                } else if x < 2.0 {
                    q1 + x * (q2 + x * (q3 + x * q4))
                } else {
                    0.0
                }
            }
            Kernel::BicubicFast => {
                let x = t.abs() / self.blur;
                let x2 = x * x;
                if x < 1.0 {
                    1.0 - 2.0 * x2 + x2 * x
                } else if x < 2.0 {
                    4.0 - 8.0 * x + 5.0 * x2 - x2 * x
                } else {
                    0.0
                }
            }
            Kernel::Sinc => {
                let x = t.abs() / self.blur;
                if x == 0.0 {
                    return 1.0;
                }
                if x > self.window {
                    return 0.0;
                }
                let a = x * PI;
                a.sin() / a
            }
            Kernel::SincWindowed => {
                let x = t / self.blur;
                let abs = x.abs();
                if abs == 0.0 {
                    return 1.0;
                }
                if abs > self.window {
                    return 0.0;
                }
                self.window * (PI * x / self.window).sin() * (x * PI).sin() / (PI * PI * x * x)
            }
            Kernel::Box => {
                let x = t / self.blur;
                if x >= -self.window && x < self.window {
                    1.0
                } else {
                    0.0
                }
            }
            Kernel::Triangle => {
                let x = t.abs() / self.blur;
                if x < 1.0 { 1.0 - x } else { 0.0 }
            }
        }
    }

    /// Ratio of negative to positive area under the filter across its window.
    pub fn percent_negative_weight(&self) -> f64 {
        let samples = 50;
        let step = self.window / samples as f64;
        let mut last_height = self.filter(-step);
        let mut positive_area = 0.0;
        let mut negative_area = 0.0;
        for i in 0..=samples + 2 {
            let height = self.filter(i as f64 * step);
            let area = (height + last_height) / 2.0 * step;
            last_height = height;
            if area > 0.0 {
                positive_area += area;
            } else {
                negative_area -= area;
            }
        }
        negative_area / positive_area
    }
}

/// Source span feeding one output pixel.
#[derive(Clone, Copy, Debug, Default)]
struct Contribution {
    left: usize,
    offset: usize,
    len: usize,
}

/// Normalized filter weights for every pixel of an output line.
#[derive(Debug)]
pub(crate) struct LineContributions {
    contributions: Vec<Contribution>,
    weights: Vec<f32>,
}

impl LineContributions {
    /// Weights mapping `input_len` source pixels onto `output_len` pixels.
    ///
    /// Both buffers are allocated through `ctx`.
    pub(crate) fn create(
        ctx: &mut Context,
        output_len: u32,
        input_len: u32,
        details: &InterpolationDetails,
    ) -> Result<Self, RenderError> {
        let scale_factor = f64::from(output_len) / f64::from(input_len);
        let downscale_factor = scale_factor.min(1.0);
        let half_source_window = (details.window + 0.5) / downscale_factor;
        let window_size = (2.0 * (half_source_window - TONY)).ceil() as usize + 1;

        let output_len = output_len as usize;
        let mut contributions = ctx.calloc::<Contribution>(output_len)?;
        let window_total = window_size.checked_mul(output_len).ok_or_else(|| {
            ctx.record(RenderError::InvalidInternalState(
                "filter window overflows usize",
            ))
        })?;
        let mut weights = ctx.calloc::<f32>(window_total)?;

        let last_src = i64::from(input_len) - 1;
        for (u, contribution) in contributions.iter_mut().enumerate() {
            let center = (u as f64 + 0.5) / scale_factor - 0.5;
            let left_edge = center.floor() as i64 - (window_size as i64 - 1) / 2;
            let right_edge = left_edge + window_size as i64 - 1;
            let left = left_edge.max(0);
            let right = right_edge.min(last_src);
            let count = (right - left + 1).max(0) as usize;
            if count > window_size || count == 0 {
                return Err(ctx.record(RenderError::InvalidInternalState(
                    "filter window exceeds its allocation",
                )));
            }

            let offset = u * window_size;
            let slot = &mut weights[offset..offset + count];
            let mut total = 0.0f64;
            for (i, w) in slot.iter_mut().enumerate() {
                let ix = left + i as i64;
                let mut add = details.filter(downscale_factor * (ix as f64 - center));
                if add.abs() <= WEIGHT_EPSILON {
                    add = 0.0;
                }
                *w = add as f32;
                total += add;
            }
            if total == 0.0 {
                return Err(ctx.record(RenderError::InvalidInternalState(
                    "filter weights sum to zero",
                )));
            }
            let factor = (1.0 / total) as f32;
            for w in slot.iter_mut() {
                *w *= factor;
            }

            // Trim zero weights from both ends.
            let first = slot.iter().position(|&w| w != 0.0).unwrap_or(0);
            let last = slot.iter().rposition(|&w| w != 0.0).unwrap_or(0);
            *contribution = Contribution {
                left: left as usize + first,
                offset: offset + first,
                len: last + 1 - first,
            };
        }

        Ok(Self {
            contributions,
            weights,
        })
    }

    /// First source index and weights for output pixel `u`.
    #[inline]
    pub(crate) fn get(&self, u: usize) -> (usize, &[f32]) {
        let c = self.contributions[u];
        (c.left, &self.weights[c.offset..c.offset + c.len])
    }

    pub(crate) fn len(&self) -> usize {
        self.contributions.len()
    }
}
