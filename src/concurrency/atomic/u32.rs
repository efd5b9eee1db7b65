use core::sync::atomic::{AtomicU32, Ordering};

use crate::token::InvariantLifetime;

/// A branded `AtomicU32`.
///
/// Used for values that are also futex words (see [`crate::concurrency::sync`]),
/// hence the [`as_atomic`](Self::as_atomic) escape hatch.
#[repr(transparent)]
pub struct GhostAtomicU32<'brand> {
    inner: AtomicU32,
    _brand: InvariantLifetime<'brand>,
}

impl<'brand> GhostAtomicU32<'brand> {
    /// Creates a new branded atomic u32.
    #[inline(always)]
    pub const fn new(value: u32) -> Self {
        Self {
            inner: AtomicU32::new(value),
            _brand: InvariantLifetime::new(),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> u32 {
        self.inner.load(order)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: u32, order: Ordering) {
        self.inner.store(value, order);
    }

    /// Adds to the current value (wrapping), returning the previous value.
    #[inline(always)]
    pub fn fetch_add(&self, value: u32, order: Ordering) -> u32 {
        self.inner.fetch_add(value, order)
    }

    /// Returns the underlying atomic, for address-based wait/wake.
    #[inline(always)]
    pub fn as_atomic(&self) -> &AtomicU32 {
        &self.inner
    }
}

unsafe impl<'brand> Send for GhostAtomicU32<'brand> {}
unsafe impl<'brand> Sync for GhostAtomicU32<'brand> {}
