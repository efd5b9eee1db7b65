//! The level array and its shared writer.
//!
//! `0` marks an unreached node; `v > 0` means BFS distance `v - 1`.

use core::sync::atomic::{AtomicU32, Ordering};

/// BFS level value.
pub type Level = u32;

/// Shared, write-only view over a caller-owned level array.
///
/// Workers of one traversal label disjoint node sets (each node sits in
/// exactly one frontier slot), so every slot has at most one writer. The
/// stores are `Relaxed`; the phase handoff and the final thread join publish
/// them.
pub(crate) struct LevelSink<'a> {
    slots: &'a [AtomicU32],
}

impl<'a> LevelSink<'a> {
    pub(crate) fn new(levels: &'a mut [Level]) -> Self {
        // SAFETY: `AtomicU32` has the same size, alignment and bit validity as
        // `u32`, and the unique borrow guarantees no non-atomic access aliases
        // the slice for `'a`.
        let slots = unsafe { &*(levels as *mut [Level] as *const [AtomicU32]) };
        Self { slots }
    }

    /// Number of slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Writes `level` for `node`.
    ///
    /// # Panics
    /// Panics if `node` is out of range.
    #[inline(always)]
    pub(crate) fn set(&self, node: usize, level: Level) {
        self.slots[node].store(level, Ordering::Relaxed);
    }
}

/// Counts nodes per level value: `hist[v]` is the number of nodes with
/// `levels[n] == v`. The result has `max(levels) + 1` entries (one for an
/// empty input).
pub fn level_histogram(levels: &[Level]) -> Vec<usize> {
    let max = levels.iter().copied().max().unwrap_or(0) as usize;
    let mut hist = vec![0usize; max + 1];
    for &level in levels {
        hist[level as usize] += 1;
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_writes_through_to_the_array() {
        let mut levels = vec![0; 4];
        {
            let sink = LevelSink::new(&mut levels);
            assert_eq!(sink.len(), 4);
            sink.set(2, 7);
            sink.set(0, 1);
        }
        assert_eq!(levels, [1, 0, 7, 0]);
    }

    #[test]
    fn histogram_counts_every_level() {
        assert_eq!(level_histogram(&[1, 2, 3, 2, 2]), [0, 1, 3, 1]);
        assert_eq!(level_histogram(&[0, 0, 1]), [2, 1]);
        assert_eq!(level_histogram(&[]), [0]);
    }
}
