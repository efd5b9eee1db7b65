use core::sync::atomic::{AtomicUsize, Ordering};

use crate::token::InvariantLifetime;

/// A branded `AtomicUsize`.
#[repr(transparent)]
pub struct GhostAtomicUsize<'brand> {
    inner: AtomicUsize,
    _brand: InvariantLifetime<'brand>,
}

impl<'brand> GhostAtomicUsize<'brand> {
    /// Creates a new branded atomic usize.
    #[inline(always)]
    pub const fn new(value: usize) -> Self {
        Self {
            inner: AtomicUsize::new(value),
            _brand: InvariantLifetime::new(),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> usize {
        self.inner.load(order)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: usize, order: Ordering) {
        self.inner.store(value, order);
    }

    /// Adds to the current value, returning the previous value.
    #[inline(always)]
    pub fn fetch_add(&self, value: usize, order: Ordering) -> usize {
        self.inner.fetch_add(value, order)
    }

    /// Subtracts from the current value, returning the previous value.
    #[inline(always)]
    pub fn fetch_sub(&self, value: usize, order: Ordering) -> usize {
        self.inner.fetch_sub(value, order)
    }

    /// Stores a value if the current value equals `current` (weak version).
    #[inline(always)]
    pub fn compare_exchange_weak(
        &self,
        current: usize,
        new: usize,
        success: Ordering,
        failure: Ordering,
    ) -> Result<usize, usize> {
        self.inner
            .compare_exchange_weak(current, new, success, failure)
    }
}

unsafe impl<'brand> Send for GhostAtomicUsize<'brand> {}
unsafe impl<'brand> Sync for GhostAtomicUsize<'brand> {}
