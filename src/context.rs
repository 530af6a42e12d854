use core::fmt;
use core::mem::size_of;

use crate::alloc::{Allocator, SystemAllocator};
use crate::error::{ErrorReason, RenderError};
use crate::limits::Limits;

/// Error state, allocation strategy, and size limits for one logical operation.
///
/// Every bitmap and every render intermediate is allocated through a context,
/// so all failures surface in one place. The first recorded error wins: later
/// failures are returned to their callers but do not replace it. While an
/// error is recorded, operations taking the context return it immediately
/// without doing any work; call [`Context::clear_error`] to continue.
pub struct Context {
    error: Option<RenderError>,
    allocator: Box<dyn Allocator>,
    limits: Limits,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("error", &self.error)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// A context with no error, the [`SystemAllocator`], and default limits.
    pub fn new() -> Self {
        Self::with_allocator(SystemAllocator)
    }

    /// A context that consults `allocator` for every allocation.
    pub fn with_allocator(allocator: impl Allocator + 'static) -> Self {
        Self {
            error: None,
            allocator: Box::new(allocator),
            limits: Limits::default(),
        }
    }

    /// Replace the size limits checked before bitmap allocation.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Swap in a different allocation strategy.
    pub fn set_allocator(&mut self, allocator: impl Allocator + 'static) {
        self.allocator = Box::new(allocator);
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Whether any operation since creation (or the last [`clear_error`](Self::clear_error)) failed.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The recorded error, if any.
    pub fn error(&self) -> Option<&RenderError> {
        self.error.as_ref()
    }

    /// The enumerated cause of the recorded error, if any.
    pub fn error_reason(&self) -> Option<ErrorReason> {
        self.error.as_ref().map(RenderError::reason)
    }

    /// Write the error message into `buffer`, returning the number of bytes written.
    ///
    /// Messages longer than the buffer are truncated on a UTF-8 character
    /// boundary. Writes nothing and returns 0 when no error is recorded.
    pub fn error_message(&self, buffer: &mut [u8]) -> usize {
        let Some(err) = &self.error else {
            return 0;
        };
        let message = err.to_string();
        let mut len = message.len().min(buffer.len());
        while !message.is_char_boundary(len) {
            len -= 1;
        }
        buffer[..len].copy_from_slice(&message.as_bytes()[..len]);
        len
    }

    /// The full error message, or an empty string when no error is recorded.
    pub fn error_message_string(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Return to the no-error state. The allocator and limits are kept.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Fail fast with the recorded error, if there is one.
    pub(crate) fn ensure_ok(&self) -> Result<(), RenderError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Record `err` unless an earlier error is already held, and hand it back.
    pub(crate) fn record(&mut self, err: RenderError) -> RenderError {
        if self.error.is_none() {
            tracing::warn!(reason = ?err.reason(), "{err}");
            self.error = Some(err.clone());
        } else {
            tracing::debug!(ignored = %err, "context already holds an error");
        }
        err
    }

    /// Pass `result` through, recording its error if it failed.
    pub(crate) fn track<T>(&mut self, result: Result<T, RenderError>) -> Result<T, RenderError> {
        result.map_err(|err| self.record(err))
    }

    /// Ask the allocator for a single `T`-sized block without keeping a buffer.
    ///
    /// Used for bookkeeping structures that live inline in Rust but that the
    /// allocation strategy still gets to veto.
    pub(crate) fn grant_header<T>(&mut self) -> Result<(), RenderError> {
        if self.allocator.grant(1, size_of::<T>()) {
            Ok(())
        } else {
            Err(self.record(RenderError::OutOfMemory {
                bytes: size_of::<T>(),
            }))
        }
    }

    /// Zero-initialized buffer of `instances` elements, vetted by the allocator.
    pub(crate) fn calloc<T: Copy + Default>(
        &mut self,
        instances: usize,
    ) -> Result<Vec<T>, RenderError> {
        let size = size_of::<T>();
        let bytes = instances.saturating_mul(size);
        if !self.allocator.grant(instances, size) {
            return Err(self.record(RenderError::OutOfMemory { bytes }));
        }
        let mut buf = Vec::new();
        if buf.try_reserve_exact(instances).is_err() {
            return Err(self.record(RenderError::OutOfMemory { bytes }));
        }
        buf.resize(instances, T::default());
        Ok(buf)
    }
}
