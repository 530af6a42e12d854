use crate::error::RenderError;

/// Exclusive upper bound on any pixel buffer the crate will request, in bytes.
///
/// Buffer sizes stay strictly below `i32::MAX` so that dimension products
/// near the integer limits are rejected as invalid rather than attempted.
pub const MAX_BITMAP_BYTES: u64 = i32::MAX as u64;

/// Resource limits for bitmap allocation.
///
/// All fields default to `None` (no limit beyond [`MAX_BITMAP_BYTES`]).
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for any single bitmap buffer.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Validate integer bitmap dimensions and return the exact buffer size in bytes.
    pub(crate) fn check_bitmap(
        &self,
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
    ) -> Result<usize, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::dimensions(
                width,
                height,
                "width and height must be non-zero",
            ));
        }
        self.check(width, height)?;
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|wh| wh.checked_mul(bytes_per_pixel))
            .ok_or(RenderError::dimensions(
                width,
                height,
                "buffer size overflows usize",
            ))?;
        if bytes as u64 >= MAX_BITMAP_BYTES {
            return Err(RenderError::dimensions(
                width,
                height,
                "buffer size exceeds the maximum bitmap size",
            ));
        }
        self.check_memory(width, height, bytes)?;
        Ok(bytes)
    }

    /// Check dimensions against limits.
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), RenderError> {
        if let Some(max_w) = self.max_width {
            if u64::from(width) > max_w {
                return Err(RenderError::dimensions(width, height, "width exceeds limit"));
            }
        }
        if let Some(max_h) = self.max_height {
            if u64::from(height) > max_h {
                return Err(RenderError::dimensions(width, height, "height exceeds limit"));
            }
        }
        if let Some(max_px) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(RenderError::dimensions(
                    width,
                    height,
                    "pixel count exceeds limit",
                ));
            }
        }
        Ok(())
    }

    /// Check that the buffer for a `width` x `height` bitmap is within memory limits.
    pub(crate) fn check_memory(
        &self,
        width: u32,
        height: u32,
        bytes: usize,
    ) -> Result<(), RenderError> {
        if let Some(max_mem) = self.max_memory_bytes {
            if bytes as u64 > max_mem {
                return Err(RenderError::dimensions(
                    width,
                    height,
                    "buffer size exceeds memory limit",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorReason;

    #[test]
    fn exact_size_is_returned() {
        let limits = Limits::default();
        assert_eq!(limits.check_bitmap(640, 480, 2), Ok(640 * 480 * 2));
        assert_eq!(limits.check_bitmap(1, 1, 4), Ok(4));
    }

    #[test]
    fn zero_and_gargantuan_are_invalid_dimensions() {
        let limits = Limits::default();
        for (w, h) in [(0, 0), (0, 5), (5, 0), (1, i32::MAX as u32), (u32::MAX, u32::MAX)] {
            let err = limits.check_bitmap(w, h, 2).unwrap_err();
            assert_eq!(err.reason(), ErrorReason::InvalidBitmapBgraDimensions, "{w}x{h}");
        }
    }

    #[test]
    fn configured_limits_apply() {
        let limits = Limits {
            max_width: Some(100),
            max_pixels: Some(1000),
            max_memory_bytes: Some(2000),
            ..Default::default()
        };
        assert!(limits.check_bitmap(101, 1, 1).is_err());
        assert!(limits.check_bitmap(50, 21, 1).is_err());
        assert!(limits.check_bitmap(30, 30, 4).is_err());
        assert!(limits.check_bitmap(30, 30, 2).is_ok());
    }

    #[test]
    fn i32_max_byte_buffers_are_rejected_for_every_depth() {
        let limits = Limits::default();
        for bpp in 1..=4 {
            let err = limits.check_bitmap(1, i32::MAX as u32, bpp).unwrap_err();
            assert_eq!(err.reason(), ErrorReason::InvalidBitmapBgraDimensions, "{bpp}");
        }
        let just_below = (i32::MAX - 1) as u32;
        assert_eq!(limits.check_bitmap(1, just_below, 1), Ok(just_below as usize));
    }

    #[test]
    fn memory_limit_reports_the_dimensions() {
        let limits = Limits {
            max_memory_bytes: Some(99),
            ..Default::default()
        };
        assert_eq!(limits.check_memory(10, 10, 99), Ok(()));
        let err = limits.check_bitmap(10, 10, 1).unwrap_err();
        assert_eq!(err.reason(), ErrorReason::InvalidBitmapBgraDimensions);
        assert_eq!(
            err,
            RenderError::dimensions(10, 10, "buffer size exceeds memory limit")
        );
    }
}
