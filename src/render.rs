//! The resize pipeline: halve, interpolate, sharpen, encode, reorient.

use crate::bitmap::{BitmapBgra, BitmapFloat};
use crate::color::{ColorSpace, bitmap_row_to_float, float_row_to_bitmap};
use crate::context::Context;
use crate::error::RenderError;
use crate::halving::{MAX_HALVING_DIVISOR, halve};
use crate::interpolation::{InterpolationDetails, LineContributions};
use crate::scale::{scale_columns, scale_rows};
use crate::sharpen::sharpen;
use crate::transform::PostTransform;

/// Configuration for one render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderDetails {
    /// Filter used for the interpolated resize.
    pub interpolation: InterpolationDetails,
    /// Integer box-downscale factor applied to the source first. 1 disables it.
    pub halving_divisor: u32,
    /// Sharpening strength in percent, applied after interpolation. 0 disables it.
    pub sharpen_percent_goal: f32,
    pub post_flip_x: bool,
    pub post_flip_y: bool,
    pub post_transpose: bool,
    /// Space in which resampling happens.
    pub colorspace: ColorSpace,
}

impl Default for RenderDetails {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderDetails {
    /// Robidoux interpolation in linear light with every other stage disabled.
    pub fn new() -> Self {
        Self {
            interpolation: InterpolationDetails::default(),
            halving_divisor: 1,
            sharpen_percent_goal: 0.0,
            post_flip_x: false,
            post_flip_y: false,
            post_transpose: false,
            colorspace: ColorSpace::Linear,
        }
    }

    /// Enabled orientation steps, in the order they run.
    pub fn post_transforms(&self) -> impl Iterator<Item = PostTransform> + '_ {
        PostTransform::ORDER.into_iter().filter(|step| match step {
            PostTransform::Transpose => self.post_transpose,
            PostTransform::FlipHorizontal => self.post_flip_x,
            PostTransform::FlipVertical => self.post_flip_y,
        })
    }
}

/// Renders a source bitmap onto a canvas of the desired output size.
///
/// The source and canvas are borrowed for the renderer's lifetime; every
/// intermediate buffer lives only inside [`Renderer::perform_render`].
#[derive(Debug)]
pub struct Renderer<'a> {
    source: &'a BitmapBgra,
    canvas: &'a mut BitmapBgra,
    details: RenderDetails,
}

impl<'a> Renderer<'a> {
    pub fn new(source: &'a BitmapBgra, canvas: &'a mut BitmapBgra, details: RenderDetails) -> Self {
        Self {
            source,
            canvas,
            details,
        }
    }

    pub fn details(&self) -> &RenderDetails {
        &self.details
    }

    pub fn details_mut(&mut self) -> &mut RenderDetails {
        &mut self.details
    }

    /// The destination bitmap.
    pub fn canvas(&self) -> &BitmapBgra {
        self.canvas
    }

    /// Run the pipeline, writing the result into the canvas.
    ///
    /// Failures are recorded on `ctx` and also returned. A context that
    /// already holds an error makes this return immediately. If the canvas
    /// was not fully written its contents are unspecified.
    ///
    /// With `post_transpose` set, the canvas keeps its dimensions: the image
    /// is resampled to `canvas.height() × canvas.width()` and transposed into place.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            source_width = self.source.width(),
            source_height = self.source.height(),
            canvas_width = self.canvas.width(),
            canvas_height = self.canvas.height(),
            divisor = self.details.halving_divisor,
        )
    )]
    pub fn perform_render(&mut self, ctx: &mut Context) -> Result<(), RenderError> {
        ctx.ensure_ok()?;
        self.validate(ctx)?;

        let divisor = self.details.halving_divisor;
        let halved;
        let source = if divisor > 1 {
            halved = halve(ctx, self.source, divisor)?;
            &halved
        } else {
            self.source
        };

        let transpose = self.details.post_transpose;
        let (width, height) = if transpose {
            (self.canvas.height(), self.canvas.width())
        } else {
            (self.canvas.width(), self.canvas.height())
        };

        let mut resampled = self.interpolate(ctx, source, width, height)?;
        sharpen(ctx, &mut resampled, self.details.sharpen_percent_goal)?;

        if transpose {
            self.canvas.swap_dimensions();
        }
        for y in 0..height {
            float_row_to_bitmap(&resampled, y, self.canvas, 0, y, self.details.colorspace);
        }
        tracing::debug!(width, height, "encoded canvas");

        for step in self.details.post_transforms() {
            step.apply(self.canvas);
        }
        Ok(())
    }

    fn validate(&self, ctx: &mut Context) -> Result<(), RenderError> {
        let divisor = self.details.halving_divisor;
        if divisor == 0 || divisor > MAX_HALVING_DIVISOR {
            return Err(ctx.record(RenderError::dimensions(
                self.source.width(),
                self.source.height(),
                "halving divisor must be between 1 and 16",
            )));
        }
        if self.source.width() / divisor == 0 || self.source.height() / divisor == 0 {
            return Err(ctx.record(RenderError::dimensions(
                self.source.width() / divisor,
                self.source.height() / divisor,
                "halving divisor exceeds source dimensions",
            )));
        }
        Ok(())
    }

    /// Decode `source` to float and resample it to `width × height`, rows first.
    fn interpolate(
        &self,
        ctx: &mut Context,
        source: &BitmapBgra,
        width: u32,
        height: u32,
    ) -> Result<BitmapFloat, RenderError> {
        let has_alpha = source.format().alpha_offset().is_some() && source.alpha_meaningful();
        let channels = if has_alpha { 4 } else { 3 };
        let space = self.details.colorspace;

        let mut decoded =
            ctx.create_bitmap_float(source.width(), source.height(), channels, has_alpha)?;
        for y in 0..source.height() {
            bitmap_row_to_float(source, y, &mut decoded, 0, y, space);
        }

        let columns =
            LineContributions::create(ctx, width, source.width(), &self.details.interpolation)?;
        let mut wide = ctx.create_bitmap_float(width, source.height(), channels, has_alpha)?;
        scale_rows(&decoded, &mut wide, &columns);
        drop(decoded);

        let rows =
            LineContributions::create(ctx, height, source.height(), &self.details.interpolation)?;
        let mut resampled = ctx.create_bitmap_float(width, height, channels, has_alpha)?;
        scale_columns(&wide, &mut resampled, &rows);

        tracing::debug!(channels, ?space, "interpolated");
        Ok(resampled)
    }
}
