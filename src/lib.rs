//! # fastscaling
//!
//! Bitmap allocation, a multi-stage resize pipeline, and conversion between
//! gamma-encoded 8-bit pixels and linear-light floats.
//!
//! Every allocation and every failure goes through a [`Context`]. Invalid
//! dimensions and exhausted memory come back as [`RenderError`] values and are
//! also recorded on the context, so a long-running process can inspect what
//! went wrong instead of aborting. The allocation strategy is pluggable
//! ([`Allocator`]), and [`FaultInjectingAllocator`] makes every failure path
//! testable.
//!
//! ## Pipeline
//!
//! [`Renderer::perform_render`] runs, in order:
//!
//! 1. **Halving**: optional integer box downscale by [`RenderDetails::halving_divisor`].
//! 2. **Interpolation**: separable resampling in linear light with any [`Filter`].
//! 3. **Sharpening**: gaussian unsharpening by [`RenderDetails::sharpen_percent_goal`].
//! 4. **Encoding** back to the canvas pixel format.
//! 5. **Post-transforms**: transpose, horizontal flip, vertical flip ([`PostTransform`]).
//!
//! ## Pixel formats
//!
//! | Format | Bytes | Channels |
//! |---|---|---|
//! | [`PixelFormat::Gray8`] | 1 | gray |
//! | [`PixelFormat::GrayAlpha8`] | 2 | gray, alpha |
//! | [`PixelFormat::Bgr24`] | 3 | B, G, R |
//! | [`PixelFormat::Bgra32`] | 4 | B, G, R, A |
//! | [`PixelFormat::Bgr32`] | 4 | B, G, R, padding |
//!
//! ## Usage
//!
//! ```
//! use fastscaling::{Context, Filter, InterpolationDetails, PixelFormat, RenderDetails, Renderer};
//!
//! let mut ctx = Context::new();
//! let mut source = ctx.create_bitmap_bgra(640, 480, true, PixelFormat::Bgra32)?;
//! source.fill(&[32, 64, 128, 255]);
//! let mut canvas = ctx.create_bitmap_bgra(200, 150, true, PixelFormat::Bgra32)?;
//!
//! let details = RenderDetails {
//!     interpolation: InterpolationDetails::create(Filter::Lanczos),
//!     halving_divisor: 2,
//!     sharpen_percent_goal: 15.0,
//!     ..RenderDetails::new()
//! };
//! Renderer::new(&source, &mut canvas, details).perform_render(&mut ctx)?;
//! assert!(!ctx.has_error());
//! # Ok::<(), fastscaling::RenderError>(())
//! ```
//!
//! ## Features
//!
//! - `rgb`: typed pixel views through [`BitmapBgra::as_pixels`].
//! - `imgref`: [`BitmapBgra::as_imgref`] (implies `rgb`).

#![forbid(unsafe_code)]

mod alloc;
mod bitmap;
mod color;
mod context;
mod error;
mod halving;
mod interpolation;
mod limits;
mod pixel;
mod render;
mod scale;
mod sharpen;
mod transform;

// Re-exports
pub use alloc::{Allocator, FaultInjectingAllocator, SystemAllocator};
pub use bitmap::{BitmapBgra, BitmapFloat};
pub use color::{
    ColorSpace, convert_linear_to_srgb, convert_srgb_to_linear, free_lookup_tables,
    linear_to_srgb, srgb_to_linear,
};
pub use context::Context;
pub use error::{ErrorReason, RenderError};
pub use halving::MAX_HALVING_DIVISOR;
pub use interpolation::{Filter, InterpolationDetails};
pub use limits::{Limits, MAX_BITMAP_BYTES};
pub use pixel::PixelFormat;
pub use render::{RenderDetails, Renderer};
pub use transform::PostTransform;
