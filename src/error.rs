use crate::pixel::PixelFormat;

/// Stable identifiers for every recoverable failure.
///
/// This set is closed: each [`RenderError`] variant maps to exactly one reason.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    /// Zero, overflowing, or over-limit integer bitmap dimensions, or a
    /// render configuration that would produce such a bitmap.
    InvalidBitmapBgraDimensions,
    /// Zero or overflowing float bitmap dimensions, or an unsupported channel count.
    InvalidBitmapFloatDimensions,
    /// The allocator strategy refused an allocation or the system ran out of memory.
    OutOfMemory,
    /// A typed view was requested whose pixel size does not match the bitmap format.
    UnsupportedPixelFormat,
    /// An internal invariant did not hold (e.g. a filter window outgrew its buffer).
    InvalidInternalState,
}

/// Errors from bitmap creation, rendering, and conversion.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("invalid bitmap dimensions {width}x{height}: {detail}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        detail: &'static str,
    },

    #[error("invalid float bitmap dimensions {width}x{height}x{channels}")]
    InvalidFloatDimensions {
        width: u32,
        height: u32,
        channels: u32,
    },

    #[error("out of memory: failed to allocate {bytes} bytes")]
    OutOfMemory { bytes: usize },

    #[error("pixel format mismatch: {format:?} has {actual} bytes per pixel, view needs {expected}")]
    LayoutMismatch {
        format: PixelFormat,
        expected: usize,
        actual: usize,
    },

    #[error("invalid internal state: {0}")]
    InvalidInternalState(&'static str),
}

impl RenderError {
    /// The enumerated cause of this error.
    pub fn reason(&self) -> ErrorReason {
        match self {
            RenderError::InvalidDimensions { .. } => ErrorReason::InvalidBitmapBgraDimensions,
            RenderError::InvalidFloatDimensions { .. } => ErrorReason::InvalidBitmapFloatDimensions,
            RenderError::OutOfMemory { .. } => ErrorReason::OutOfMemory,
            RenderError::LayoutMismatch { .. } => ErrorReason::UnsupportedPixelFormat,
            RenderError::InvalidInternalState(_) => ErrorReason::InvalidInternalState,
        }
    }

    pub(crate) fn dimensions(width: u32, height: u32, detail: &'static str) -> Self {
        RenderError::InvalidDimensions {
            width,
            height,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_reason() {
        let cases = [
            (
                RenderError::dimensions(0, 0, "zero"),
                ErrorReason::InvalidBitmapBgraDimensions,
            ),
            (
                RenderError::InvalidFloatDimensions {
                    width: 1,
                    height: 1,
                    channels: 9,
                },
                ErrorReason::InvalidBitmapFloatDimensions,
            ),
            (
                RenderError::OutOfMemory { bytes: 16 },
                ErrorReason::OutOfMemory,
            ),
            (
                RenderError::LayoutMismatch {
                    format: PixelFormat::Bgr24,
                    expected: 4,
                    actual: 3,
                },
                ErrorReason::UnsupportedPixelFormat,
            ),
            (
                RenderError::InvalidInternalState("window"),
                ErrorReason::InvalidInternalState,
            ),
        ];
        for (err, reason) in cases {
            assert_eq!(err.reason(), reason, "{err}");
        }
    }

    #[test]
    fn message_carries_payload() {
        let err = RenderError::dimensions(3, 0, "width and height must be non-zero");
        assert_eq!(
            err.to_string(),
            "invalid bitmap dimensions 3x0: width and height must be non-zero"
        );
        assert_eq!(
            RenderError::OutOfMemory { bytes: 640 }.to_string(),
            "out of memory: failed to allocate 640 bytes"
        );
    }
}
