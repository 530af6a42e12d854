//! Allocation strategies consulted by a [`Context`](crate::Context).
//!
//! Every zero-initialized buffer the crate creates (bitmap pixels, halving row
//! accumulators, float intermediates, filter weights) is first offered to the
//! context's [`Allocator`] as `(instances, size_of_instance)`. A refusal is
//! reported as [`ErrorReason::OutOfMemory`](crate::ErrorReason::OutOfMemory),
//! which makes every out-of-memory path in the pipeline reachable from tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

/// Strategy deciding whether a zero-initialized allocation may proceed.
///
/// The context performs the allocation itself with fallible reservation, so
/// genuine exhaustion is still reported even by a strategy that grants
/// everything.
pub trait Allocator: Send + Sync {
    /// Return `false` to fail an allocation of `instances * size_of_instance` bytes.
    fn grant(&self, instances: usize, size_of_instance: usize) -> bool;
}

/// Grants every request; failures come only from the system allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn grant(&self, _instances: usize, _size_of_instance: usize) -> bool {
        true
    }
}

impl<A: Allocator + ?Sized> Allocator for Arc<A> {
    fn grant(&self, instances: usize, size_of_instance: usize) -> bool {
        (**self).grant(instances, size_of_instance)
    }
}

impl<A: Allocator + ?Sized> Allocator for Box<A> {
    fn grant(&self, instances: usize, size_of_instance: usize) -> bool {
        (**self).grant(instances, size_of_instance)
    }
}

/// Allocator that fails on demand and records the last request it saw.
///
/// Share it with a context through an [`Arc`] to inspect it after a failure:
///
/// ```
/// use std::sync::Arc;
/// use fastscaling::{Context, ErrorReason, FaultInjectingAllocator, PixelFormat};
///
/// let faults = Arc::new(FaultInjectingAllocator::new());
/// let mut ctx = Context::with_allocator(faults.clone());
/// faults.fail_allocation_of(16 * 16 * 4);
///
/// assert!(ctx.create_bitmap_bgra(16, 16, true, PixelFormat::Bgra32).is_err());
/// assert_eq!(ctx.error_reason(), Some(ErrorReason::OutOfMemory));
/// assert_eq!(faults.last_attempted_allocation(), Some(16 * 16 * 4));
/// ```
#[derive(Debug)]
pub struct FaultInjectingAllocator {
    last_attempted: AtomicUsize,
    attempted_any: AtomicBool,
    always_fail: AtomicBool,
    failure_threshold: AtomicUsize,
    failure_size: AtomicUsize,
    allowed_successes: AtomicI64,
}

impl Default for FaultInjectingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultInjectingAllocator {
    /// An allocator that grants everything until told otherwise.
    pub fn new() -> Self {
        Self {
            last_attempted: AtomicUsize::new(0),
            attempted_any: AtomicBool::new(false),
            always_fail: AtomicBool::new(false),
            failure_threshold: AtomicUsize::new(usize::MAX),
            failure_size: AtomicUsize::new(usize::MAX),
            allowed_successes: AtomicI64::new(i64::MAX),
        }
    }

    /// Refuse every request.
    pub fn always_fail(&self) {
        self.always_fail.store(true, Ordering::Relaxed);
    }

    /// Refuse requests of exactly `byte_count` bytes.
    pub fn fail_allocation_of(&self, byte_count: usize) {
        self.failure_size.store(byte_count, Ordering::Relaxed);
    }

    /// Refuse requests larger than `byte_count` bytes.
    pub fn fail_allocation_if_size_larger_than(&self, byte_count: usize) {
        self.failure_threshold.store(byte_count, Ordering::Relaxed);
    }

    /// Grant the next `times` requests, then refuse everything.
    pub fn fail_after(&self, times: u32) {
        self.allowed_successes
            .store(i64::from(times), Ordering::Relaxed);
    }

    /// Size in bytes of the most recent request, granted or not.
    pub fn last_attempted_allocation(&self) -> Option<usize> {
        self.attempted_any
            .load(Ordering::Relaxed)
            .then(|| self.last_attempted.load(Ordering::Relaxed))
    }
}

impl Allocator for FaultInjectingAllocator {
    fn grant(&self, instances: usize, size_of_instance: usize) -> bool {
        let bytes = instances.saturating_mul(size_of_instance);
        self.last_attempted.store(bytes, Ordering::Relaxed);
        self.attempted_any.store(true, Ordering::Relaxed);

        if self.always_fail.load(Ordering::Relaxed) {
            return false;
        }
        if bytes > self.failure_threshold.load(Ordering::Relaxed) {
            return false;
        }
        if bytes == self.failure_size.load(Ordering::Relaxed) {
            return false;
        }
        self.allowed_successes.fetch_sub(1, Ordering::Relaxed) > 0
    }
}
