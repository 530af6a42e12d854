/// Integer pixel memory layout. All formats store 8-bit gamma-encoded samples.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Single channel, 8-bit grayscale.
    Gray8,
    /// 2 channels, 8-bit gray followed by 8-bit alpha.
    GrayAlpha8,
    /// 3 channels, 8-bit BGR.
    Bgr24,
    /// 4 channels, 8-bit BGRA.
    Bgra32,
    /// 4 bytes, 8-bit BGRX (opaque; 4th byte is padding, not alpha).
    Bgr32,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::GrayAlpha8 => 2,
            Self::Bgr24 => 3,
            Self::Bgra32 | Self::Bgr32 => 4,
        }
    }

    /// Number of meaningful channels (padding bytes are not channels).
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::GrayAlpha8 => 2,
            Self::Bgr24 | Self::Bgr32 => 3,
            Self::Bgra32 => 4,
        }
    }

    /// Byte offset of the alpha sample within a pixel, if the format has one.
    pub fn alpha_offset(&self) -> Option<usize> {
        match self {
            Self::GrayAlpha8 => Some(1),
            Self::Bgra32 => Some(3),
            Self::Gray8 | Self::Bgr24 | Self::Bgr32 => None,
        }
    }

    /// Whether pixels are a single gray sample (plus optional alpha).
    pub fn is_gray(&self) -> bool {
        matches!(self, Self::Gray8 | Self::GrayAlpha8)
    }
}
