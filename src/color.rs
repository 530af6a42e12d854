//! sRGB transfer functions and row conversion between integer and float bitmaps.
//!
//! Decoding goes through a process-wide 256-entry table built on first use.
//! [`free_lookup_tables`] drops it; the next conversion rebuilds it.

use std::sync::{Arc, Mutex, PoisonError};

use crate::bitmap::{BitmapBgra, BitmapFloat};
use crate::pixel::PixelFormat;

/// Space in which float samples live while resampling.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Decode through the sRGB transfer curve to linear light.
    #[default]
    Linear,
    /// Keep gamma-encoded values, only rescaled to 0..=1.
    Srgb,
}

pub use linear_srgb::precise::{linear_to_srgb, srgb_to_linear};

/// Round a 0..=255 float to a byte, saturating. NaN maps to 0.
#[inline]
fn clamp_to_u8(v: f32) -> u8 {
    (v + 0.5).clamp(0.0, 255.0) as u8
}

struct LookupTables {
    srgb_to_linear: [f32; 256],
}

impl LookupTables {
    fn build() -> Self {
        let mut srgb = [0f32; 256];
        for (v, i) in srgb.iter_mut().zip(0..=u8::MAX) {
            *v = linear_srgb::default::srgb_u8_to_linear(i);
        }
        Self {
            srgb_to_linear: srgb,
        }
    }
}

static TABLES: Mutex<Option<Arc<LookupTables>>> = Mutex::new(None);

fn lookup_tables() -> Arc<LookupTables> {
    let mut guard = TABLES.lock().unwrap_or_else(PoisonError::into_inner);
    guard
        .get_or_insert_with(|| {
            tracing::debug!("building sRGB lookup tables");
            Arc::new(LookupTables::build())
        })
        .clone()
}

/// Release the process-wide conversion tables.
///
/// Conversions already in progress keep their own reference; later ones
/// rebuild the tables on demand.
pub fn free_lookup_tables() {
    let mut guard = TABLES.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = None;
}

/// Byte <-> float codec for one color space.
struct Codec {
    tables: Arc<LookupTables>,
    space: ColorSpace,
}

impl Codec {
    fn new(space: ColorSpace) -> Self {
        Self {
            tables: lookup_tables(),
            space,
        }
    }

    #[inline]
    fn decode(&self, v: u8) -> f32 {
        match self.space {
            ColorSpace::Linear => self.tables.srgb_to_linear[v as usize],
            ColorSpace::Srgb => v as f32 * (1.0 / 255.0),
        }
    }

    #[inline]
    fn encode(&self, v: f32) -> u8 {
        match self.space {
            ColorSpace::Linear => clamp_to_u8(linear_to_srgb(v) * 255.0),
            ColorSpace::Srgb => clamp_to_u8(v * 255.0),
        }
    }
}

/// Rec. 709 luminance of B, G, R.
#[inline]
fn luma(b: f32, g: f32, r: f32) -> f32 {
    0.0722 * b + 0.7152 * g + 0.2126 * r
}

/// Decode one row of `source` to linear light, writing at `(dest_x, dest_y)` in `dest`.
///
/// Writes `min(source.width(), dest.width() - dest_x)` pixels. The channel
/// count comes from `dest`:
///
/// | dest channels | written |
/// |---|---|
/// | 4 | B, G, R, A |
/// | 3 | B, G, R |
/// | 2 | luma, A |
/// | 1 | luma |
///
/// Gray sources replicate into B, G and R. Alpha is read only when the source
/// format has an alpha byte and [`BitmapBgra::alpha_meaningful`] is set;
/// otherwise it is 1.0. Color channels are multiplied by alpha when
/// [`BitmapFloat::alpha_premultiplied`] is set on `dest`.
///
/// # Panics
///
/// If `source_row` is outside `source`, or `(dest_x, dest_y)` is outside `dest`.
pub fn convert_srgb_to_linear(
    source: &BitmapBgra,
    source_row: u32,
    dest: &mut BitmapFloat,
    dest_x: u32,
    dest_y: u32,
) {
    bitmap_row_to_float(source, source_row, dest, dest_x, dest_y, ColorSpace::Linear);
}

/// Encode one row of linear-light `source` into `dest` at `(dest_x, dest_y)`.
///
/// The inverse of [`convert_srgb_to_linear`]: premultiplied samples are
/// divided by alpha, values are re-encoded through the sRGB curve, rounded,
/// and clamped. Gray destinations receive luma. Destination alpha is 255 when
/// the float bitmap has no alpha; the padding byte of [`PixelFormat::Bgr32`]
/// is always 255.
///
/// # Panics
///
/// If `source_row` is outside `source`, or `(dest_x, dest_y)` is outside `dest`.
pub fn convert_linear_to_srgb(
    source: &BitmapFloat,
    source_row: u32,
    dest: &mut BitmapBgra,
    dest_x: u32,
    dest_y: u32,
) {
    float_row_to_bitmap(source, source_row, dest, dest_x, dest_y, ColorSpace::Linear);
}

pub(crate) fn bitmap_row_to_float(
    source: &BitmapBgra,
    source_row: u32,
    dest: &mut BitmapFloat,
    dest_x: u32,
    dest_y: u32,
    space: ColorSpace,
) {
    assert!(
        source_row < source.height(),
        "source row {source_row} out of range (height {})",
        source.height()
    );
    assert!(
        dest_x < dest.width() && dest_y < dest.height(),
        "destination ({dest_x}, {dest_y}) out of range ({}x{})",
        dest.width(),
        dest.height()
    );

    let codec = Codec::new(space);
    let format = source.format();
    let bpp = format.bytes_per_pixel();
    let gray = format.is_gray();
    let alpha_offset = format.alpha_offset().filter(|_| source.alpha_meaningful());
    let premultiply = dest.alpha_premultiplied();
    let ch = dest.channels() as usize;
    let count = source.width().min(dest.width() - dest_x) as usize;

    let src = &source.row(source_row)[..count * bpp];
    let start = dest_x as usize * ch;
    let out = &mut dest.row_mut(dest_y)[start..start + count * ch];

    for (px, out) in src.chunks_exact(bpp).zip(out.chunks_exact_mut(ch)) {
        let (mut b, mut g, mut r) = if gray {
            let v = codec.decode(px[0]);
            (v, v, v)
        } else {
            (codec.decode(px[0]), codec.decode(px[1]), codec.decode(px[2]))
        };
        let a = alpha_offset.map_or(1.0, |o| px[o] as f32 * (1.0 / 255.0));
        if premultiply {
            b *= a;
            g *= a;
            r *= a;
        }
        let y = if gray { b } else { luma(b, g, r) };
        match ch {
            4 => {
                out[0] = b;
                out[1] = g;
                out[2] = r;
                out[3] = a;
            }
            3 => {
                out[0] = b;
                out[1] = g;
                out[2] = r;
            }
            2 => {
                out[0] = y;
                out[1] = a;
            }
            _ => out[0] = y,
        }
    }
}

pub(crate) fn float_row_to_bitmap(
    source: &BitmapFloat,
    source_row: u32,
    dest: &mut BitmapBgra,
    dest_x: u32,
    dest_y: u32,
    space: ColorSpace,
) {
    assert!(
        source_row < source.height(),
        "source row {source_row} out of range (height {})",
        source.height()
    );
    assert!(
        dest_x < dest.width() && dest_y < dest.height(),
        "destination ({dest_x}, {dest_y}) out of range ({}x{})",
        dest.width(),
        dest.height()
    );

    let codec = Codec::new(space);
    let format = dest.format();
    let bpp = format.bytes_per_pixel();
    let ch = source.channels() as usize;
    let demultiply = source.alpha_premultiplied() && source.has_alpha();
    let count = source.width().min(dest.width() - dest_x) as usize;

    let src = &source.row(source_row)[..count * ch];
    let start = dest_x as usize * bpp;
    let out = &mut dest.row_mut(dest_y)[start..start + count * bpp];

    for (px, out) in src.chunks_exact(ch).zip(out.chunks_exact_mut(bpp)) {
        let (mut b, mut g, mut r, a) = match ch {
            4 => (px[0], px[1], px[2], px[3]),
            3 => (px[0], px[1], px[2], 1.0),
            2 => (px[0], px[0], px[0], px[1]),
            _ => (px[0], px[0], px[0], 1.0),
        };
        if demultiply {
            if a > 0.0 {
                let inv = 1.0 / a;
                b *= inv;
                g *= inv;
                r *= inv;
            } else {
                b = 0.0;
                g = 0.0;
                r = 0.0;
            }
        }
        let alpha = clamp_to_u8(a * 255.0);
        match format {
            PixelFormat::Gray8 => out[0] = codec.encode(luma(b, g, r)),
            PixelFormat::GrayAlpha8 => {
                out[0] = codec.encode(luma(b, g, r));
                out[1] = alpha;
            }
            PixelFormat::Bgr24 => {
                out[0] = codec.encode(b);
                out[1] = codec.encode(g);
                out[2] = codec.encode(r);
            }
            PixelFormat::Bgra32 => {
                out[0] = codec.encode(b);
                out[1] = codec.encode(g);
                out[2] = codec.encode(r);
                out[3] = alpha;
            }
            PixelFormat::Bgr32 => {
                out[0] = codec.encode(b);
                out[1] = codec.encode(g);
                out[2] = codec.encode(r);
                out[3] = 255;
            }
        }
    }
}
