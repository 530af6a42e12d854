use core::fmt;
use core::mem::size_of;

use crate::context::Context;
use crate::error::RenderError;
use crate::limits::MAX_BITMAP_BYTES;
use crate::pixel::PixelFormat;

/// Row-major, gamma-encoded 8-bit pixel buffer.
///
/// Rows are tightly packed: `stride == width * bytes_per_pixel` and the buffer
/// holds exactly `stride * height` bytes. The buffer is released when the
/// bitmap is dropped.
pub struct BitmapBgra {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    alpha_meaningful: bool,
    pixels: Vec<u8>,
}

impl fmt::Debug for BitmapBgra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapBgra")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .field("alpha_meaningful", &self.alpha_meaningful)
            .finish_non_exhaustive()
    }
}

impl BitmapBgra {
    fn from_parts(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width as usize * format.bytes_per_pixel(),
            format,
            alpha_meaningful: format.alpha_offset().is_some(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Whether the alpha bytes carry transparency. Defaults to `true` for
    /// formats with an alpha channel; when `false` they are ignored on read.
    pub fn alpha_meaningful(&self) -> bool {
        self.alpha_meaningful
    }

    pub fn set_alpha_meaningful(&mut self, meaningful: bool) {
        self.alpha_meaningful = meaningful;
    }

    /// The whole pixel buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Pixel bytes of row `y`.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {y} out of range (height {})", self.height);
        let start = y as usize * self.stride;
        &self.pixels[start..start + self.stride]
    }

    /// Mutable pixel bytes of row `y`.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height, "row {y} out of range (height {})", self.height);
        let start = y as usize * self.stride;
        &mut self.pixels[start..start + self.stride]
    }

    /// Bytes of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// If the coordinates are outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width, "column {x} out of range (width {})", self.width);
        let bpp = self.bytes_per_pixel();
        let start = x as usize * bpp;
        &self.row(y)[start..start + bpp]
    }

    /// Set every pixel to `value` (one pixel's worth of bytes).
    ///
    /// # Panics
    ///
    /// If `value.len()` differs from the bytes per pixel.
    pub fn fill(&mut self, value: &[u8]) {
        assert_eq!(value.len(), self.bytes_per_pixel(), "fill value size");
        for px in self.pixels.chunks_exact_mut(value.len()) {
            px.copy_from_slice(value);
        }
    }

    /// Reinterpret the packed buffer with width and height exchanged.
    pub(crate) fn swap_dimensions(&mut self) {
        core::mem::swap(&mut self.width, &mut self.height);
        self.stride = self.width as usize * self.bytes_per_pixel();
    }

    /// Reinterpret pixel data as a typed pixel slice.
    ///
    /// Returns [`RenderError::LayoutMismatch`] if `P` is not exactly one pixel wide.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P>(&self) -> Result<&[P], RenderError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        use rgb::AsPixels as _;
        self.check_pixel_size::<P>()?;
        Ok(self.pixels.as_pixels())
    }

    /// Mutable typed pixel slice.
    ///
    /// Returns [`RenderError::LayoutMismatch`] if `P` is not exactly one pixel wide.
    #[cfg(feature = "rgb")]
    pub fn as_pixels_mut<P>(&mut self) -> Result<&mut [P], RenderError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        use rgb::AsPixels as _;
        self.check_pixel_size::<P>()?;
        Ok(self.pixels.as_pixels_mut())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    ///
    /// Returns [`RenderError::LayoutMismatch`] if `P` is not exactly one pixel wide.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P>(&self) -> Result<imgref::ImgRef<'_, P>, RenderError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }

    #[cfg(feature = "rgb")]
    fn check_pixel_size<P>(&self) -> Result<(), RenderError> {
        if size_of::<P>() != self.bytes_per_pixel() {
            return Err(RenderError::LayoutMismatch {
                format: self.format,
                expected: size_of::<P>(),
                actual: self.bytes_per_pixel(),
            });
        }
        Ok(())
    }
}

/// Row-major buffer of linear-light `f32` samples, channels interleaved per pixel.
pub struct BitmapFloat {
    width: u32,
    height: u32,
    channels: u32,
    alpha_premultiplied: bool,
    alpha_meaningful: bool,
    pixels: Vec<f32>,
}

impl fmt::Debug for BitmapFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapFloat")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("alpha_premultiplied", &self.alpha_premultiplied)
            .finish_non_exhaustive()
    }
}

/// Validate float bitmap dimensions, returning the sample count.
fn float_count(width: u32, height: u32, channels: u32) -> Result<usize, RenderError> {
    let invalid = RenderError::InvalidFloatDimensions {
        width,
        height,
        channels,
    };
    if width == 0 || height == 0 || !(1..=4).contains(&channels) {
        return Err(invalid);
    }
    let count = (width as usize)
        .checked_mul(height as usize)
        .and_then(|wh| wh.checked_mul(channels as usize))
        .ok_or(invalid.clone())?;
    if count as u64 > MAX_BITMAP_BYTES / size_of::<f32>() as u64 {
        return Err(invalid);
    }
    Ok(count)
}

impl BitmapFloat {
    /// Allocate a zeroed float bitmap without a [`Context`].
    ///
    /// `channels` must be 1 to 4. The last channel of a 2- or 4-channel
    /// bitmap is alpha.
    pub fn new(
        width: u32,
        height: u32,
        channels: u32,
        alpha_premultiplied: bool,
    ) -> Result<Self, RenderError> {
        let count = float_count(width, height, channels)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| RenderError::OutOfMemory {
                bytes: count * size_of::<f32>(),
            })?;
        pixels.resize(count, 0.0);
        Ok(Self::from_parts(
            width,
            height,
            channels,
            alpha_premultiplied,
            pixels,
        ))
    }

    fn from_parts(
        width: u32,
        height: u32,
        channels: u32,
        alpha_premultiplied: bool,
        pixels: Vec<f32>,
    ) -> Self {
        Self {
            width,
            height,
            channels,
            alpha_premultiplied,
            alpha_meaningful: channels == 2 || channels == 4,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Total samples: `width * height * channels`.
    pub fn float_count(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Samples per row.
    pub fn float_stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Whether color samples are already multiplied by alpha.
    pub fn alpha_premultiplied(&self) -> bool {
        self.alpha_premultiplied
    }

    pub fn set_alpha_premultiplied(&mut self, premultiplied: bool) {
        self.alpha_premultiplied = premultiplied;
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 2 || self.channels == 4
    }

    pub fn alpha_meaningful(&self) -> bool {
        self.alpha_meaningful
    }

    pub fn set_alpha_meaningful(&mut self, meaningful: bool) {
        self.alpha_meaningful = meaningful;
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [f32] {
        &mut self.pixels
    }

    /// Samples of row `y`.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row(&self, y: u32) -> &[f32] {
        assert!(y < self.height, "row {y} out of range (height {})", self.height);
        let stride = self.float_stride();
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Mutable samples of row `y`.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [f32] {
        assert!(y < self.height, "row {y} out of range (height {})", self.height);
        let stride = self.float_stride();
        let start = y as usize * stride;
        &mut self.pixels[start..start + stride]
    }
}

impl Context {
    /// Create a zero-filled integer bitmap.
    ///
    /// Dimensions are validated before anything is allocated: zero sizes,
    /// byte counts that overflow or reach [`MAX_BITMAP_BYTES`], and sizes
    /// over the context's [`Limits`](crate::Limits) fail with
    /// [`ErrorReason::InvalidBitmapBgraDimensions`](crate::ErrorReason::InvalidBitmapBgraDimensions).
    /// The allocator is then asked for the bitmap header and for exactly
    /// `width * height * bytes_per_pixel` pixel bytes; a refusal of either
    /// fails with [`ErrorReason::OutOfMemory`](crate::ErrorReason::OutOfMemory).
    ///
    /// Safe code never observes uninitialized memory, so the buffer is
    /// zero-filled whether or not `zeroed` is set.
    pub fn create_bitmap_bgra(
        &mut self,
        width: u32,
        height: u32,
        zeroed: bool,
        format: PixelFormat,
    ) -> Result<BitmapBgra, RenderError> {
        self.ensure_ok()?;
        let checked = self
            .limits()
            .check_bitmap(width, height, format.bytes_per_pixel());
        let bytes = self.track(checked)?;
        self.grant_header::<BitmapBgra>()?;
        let pixels = self.calloc::<u8>(bytes)?;
        tracing::trace!(width, height, ?format, zeroed, bytes, "created bitmap");
        Ok(BitmapBgra::from_parts(width, height, format, pixels))
    }

    /// Create a zero-filled float bitmap through this context's allocator.
    pub fn create_bitmap_float(
        &mut self,
        width: u32,
        height: u32,
        channels: u32,
        alpha_premultiplied: bool,
    ) -> Result<BitmapFloat, RenderError> {
        self.ensure_ok()?;
        let count = self.track(float_count(width, height, channels))?;
        let pixels = self.calloc::<f32>(count)?;
        Ok(BitmapFloat::from_parts(
            width,
            height,
            channels,
            alpha_premultiplied,
            pixels,
        ))
    }
}
