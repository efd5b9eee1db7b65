//! The Frontier Pair: two reusable node buffers with atomic reservation cursors.
//!
//! Within one level, `current` is only read and `next` is only written. Both
//! directions are partitioned with a single `fetch_add` per block:
//!
//! - readers call [`Frontier::next_read_block`] until it returns an empty range,
//! - writers go through a [`BlockWriter`], which reserves `write_block` slots at
//!   a time and pads the unused tail of its last reservation with
//!   [`SENTINEL`] on [`finish`](BlockWriter::finish).
//!
//! A buffer is sized `order + write_block * workers`: every reservation but a
//! worker's last is completely filled with distinct claimed nodes, so the write
//! cursor can never run past the end.

use core::cell::UnsafeCell;
use core::ops::Range;
use core::sync::atomic::Ordering;

use crossbeam_utils::CachePadded;

use crate::concurrency::atomic::GhostAtomicUsize;
use crate::graph::{Node, SENTINEL};
use crate::GhostToken;

/// Buffer capacity needed for a traversal of `order` nodes.
///
/// # Panics
/// Panics if the capacity does not fit in `usize`; a validated
/// [`EngineConfig`](crate::EngineConfig) never gets there.
#[inline]
pub fn frontier_capacity(order: usize, write_block: usize, workers: usize) -> usize {
    write_block
        .checked_mul(workers)
        .and_then(|slack| slack.checked_add(order))
        .unwrap_or_else(|| {
            panic!("frontier capacity overflows: order {order} + write block {write_block} x {workers} workers")
        })
}

/// A fixed-capacity node buffer with a logical length and a shared cursor.
///
/// The cursor serves as the read cursor while the buffer is `current` and as
/// the write cursor while it is `next`.
pub struct Frontier<'brand> {
    slots: Box<[UnsafeCell<Node>]>,
    len: GhostAtomicUsize<'brand>,
    head: CachePadded<GhostAtomicUsize<'brand>>,
}

// SAFETY: slots are only touched through disjoint cursor reservations, or through
// the `unsafe` accessors whose callers guarantee exclusivity.
unsafe impl Sync for Frontier<'_> {}

impl<'brand> Frontier<'brand> {
    /// Creates an empty buffer of `capacity` slots, all set to the sentinel.
    pub fn with_capacity(_token: &GhostToken<'brand>, capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| UnsafeCell::new(SENTINEL)).collect(),
            len: GhostAtomicUsize::new(0),
            head: CachePadded::new(GhostAtomicUsize::new(0)),
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Logical length: the readable prefix, sentinel padding included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Returns `true` if the buffer holds nothing to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sets the logical length.
    ///
    /// # Panics
    /// Panics if `len` exceeds the capacity.
    pub fn set_len(&self, len: usize) {
        assert!(len <= self.capacity(), "length {len} exceeds capacity {}", self.capacity());
        self.len.store(len, Ordering::Relaxed);
    }

    /// Current cursor position. After a round of writes this is the used length.
    #[inline]
    pub fn head(&self) -> usize {
        self.head.load(Ordering::Relaxed)
    }

    /// Rewinds the cursor to the start of the buffer.
    #[inline]
    pub fn reset_head(&self) {
        self.head.store(0, Ordering::Relaxed);
    }

    /// Reserves up to `block` unread entries. Returns an empty range once the
    /// logical length is exhausted.
    #[inline]
    pub fn next_read_block(&self, block: usize) -> Range<usize> {
        let len = self.len();
        let low = self.head.fetch_add(block, Ordering::Relaxed);
        if low >= len {
            return len..len;
        }
        low..low.saturating_add(block).min(len)
    }

    /// Reserves exactly `block` slots for writing.
    ///
    /// # Panics
    /// Panics if the reservation would run past the capacity, which means the
    /// buffer was sized for fewer workers or a smaller block.
    #[inline]
    pub fn next_write_block(&self, block: usize) -> Range<usize> {
        let low = self.head.fetch_add(block, Ordering::Relaxed);
        let high = low.saturating_add(block);
        assert!(
            high <= self.capacity(),
            "write reservation {low}..{high} overflows frontier capacity {}",
            self.capacity()
        );
        low..high
    }

    /// Returns the entries in `range`.
    ///
    /// # Safety
    /// No slot in `range` may be written for the lifetime of the returned slice.
    #[inline]
    pub unsafe fn slice(&self, range: Range<usize>) -> &[Node] {
        let cells = &self.slots[range];
        core::slice::from_raw_parts(UnsafeCell::raw_get(cells.as_ptr()), cells.len())
    }

    /// Returns the entries in `range` mutably.
    ///
    /// # Safety
    /// No other reference to a slot in `range` may exist for the lifetime of
    /// the returned slice.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn slice_mut(&self, range: Range<usize>) -> &mut [Node] {
        let cells = &self.slots[range];
        core::slice::from_raw_parts_mut(UnsafeCell::raw_get(cells.as_ptr()), cells.len())
    }

    /// Writes one slot.
    ///
    /// # Safety
    /// The caller must own `index` through a write reservation.
    #[inline(always)]
    unsafe fn write(&self, index: usize, node: Node) {
        *self.slots[index].get() = node;
    }

    /// The first `len` slots, for single-threaded post-processing.
    pub fn prefix_mut(&mut self, len: usize) -> &mut [Node] {
        // SAFETY: `&mut self` rules out every concurrent reservation.
        unsafe { self.slice_mut(0..len) }
    }

    /// Replaces the contents with `nodes`, for single-threaded seeding.
    pub fn fill_from(&mut self, nodes: &[Node]) {
        assert!(nodes.len() <= self.capacity(), "{} nodes exceed capacity {}", nodes.len(), self.capacity());
        for (slot, &node) in self.slots.iter_mut().zip(nodes) {
            *slot.get_mut() = node;
        }
        self.len.store(nodes.len(), Ordering::Relaxed);
        self.head.store(0, Ordering::Relaxed);
    }
}

/// Emits nodes into a frontier through block reservations.
///
/// Reserves lazily: a writer that never pushes never reserves, so a level with
/// no discoveries leaves the write cursor at zero.
pub struct BlockWriter<'f, 'brand> {
    frontier: &'f Frontier<'brand>,
    block: usize,
    cursor: usize,
    end: usize,
}

impl<'f, 'brand> BlockWriter<'f, 'brand> {
    /// Creates a writer reserving `block` slots at a time.
    pub fn new(frontier: &'f Frontier<'brand>, block: usize) -> Self {
        assert!(block != 0, "write block must be > 0");
        Self {
            frontier,
            block,
            cursor: 0,
            end: 0,
        }
    }

    /// Appends `node`, reserving a new block when the current one is full.
    #[inline(always)]
    pub fn push(&mut self, node: Node) {
        if self.cursor == self.end {
            let range = self.frontier.next_write_block(self.block);
            self.cursor = range.start;
            self.end = range.end;
        }
        // SAFETY: `cursor` lies in a range this writer reserved.
        unsafe { self.frontier.write(self.cursor, node) };
        self.cursor += 1;
    }

    /// Pads the rest of the last reservation with sentinels.
    pub fn finish(self) {
        for index in self.cursor..self.end {
            // SAFETY: the tail of this writer's own reservation.
            unsafe { self.frontier.write(index, SENTINEL) };
        }
    }
}

/// The `current` / `next` buffers of one traversal, swapped every level.
pub struct FrontierPair<'brand> {
    buffers: [Frontier<'brand>; 2],
    current: GhostAtomicUsize<'brand>,
}

impl<'brand> FrontierPair<'brand> {
    /// Creates both buffers with `capacity` slots, `current` seeded with `seed`.
    pub fn new(token: &GhostToken<'brand>, capacity: usize, seed: &[Node]) -> Self {
        let mut current = Frontier::with_capacity(token, capacity);
        current.fill_from(seed);
        let next = Frontier::with_capacity(token, capacity);
        next.set_len(capacity);
        Self {
            buffers: [current, next],
            current: GhostAtomicUsize::new(0),
        }
    }

    /// The buffer being read this level.
    #[inline]
    pub fn current(&self) -> &Frontier<'brand> {
        &self.buffers[self.current.load(Ordering::Relaxed)]
    }

    /// The buffer being written this level.
    #[inline]
    pub fn next(&self) -> &Frontier<'brand> {
        &self.buffers[1 - self.current.load(Ordering::Relaxed)]
    }

    /// Swaps the roles of the two buffers.
    ///
    /// Only the elected finisher of a phase may call this.
    pub fn swap(&self) {
        let cur = self.current.load(Ordering::Relaxed);
        self.current.store(1 - cur, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn read_blocks_cover_the_length_once() {
        GhostToken::new(|token| {
            let mut f = Frontier::with_capacity(&token, 16);
            f.fill_from(&[1, 2, 3, 4, 5, 6, 7]);
            assert_eq!(f.next_read_block(3), 0..3);
            assert_eq!(f.next_read_block(3), 3..6);
            assert_eq!(f.next_read_block(3), 6..7);
            assert!(f.next_read_block(3).is_empty());
            assert!(f.next_read_block(3).is_empty());
            // SAFETY: nothing writes `f`.
            assert_eq!(unsafe { f.slice(2..5) }, &[3, 4, 5]);
        });
    }

    #[test]
    fn writer_pads_its_tail_with_sentinels() {
        GhostToken::new(|token| {
            let f = Frontier::with_capacity(&token, 32);
            let mut w = BlockWriter::new(&f, 4);
            for n in 10..15 {
                w.push(n);
            }
            w.finish();
            assert_eq!(f.head(), 8);
            // SAFETY: the writer is gone.
            assert_eq!(unsafe { f.slice(0..8) }, &[10, 11, 12, 13, 14, SENTINEL, SENTINEL, SENTINEL]);
        });
    }

    #[test]
    fn idle_writer_reserves_nothing() {
        GhostToken::new(|token| {
            let f = Frontier::with_capacity(&token, 8);
            BlockWriter::new(&f, 4).finish();
            assert_eq!(f.head(), 0);
        });
    }

    #[test]
    fn concurrent_writers_never_overlap_or_overflow() {
        const WORKERS: usize = 4;
        const BLOCK: usize = 7;
        const ORDER: usize = 1000;
        GhostToken::new(|token| {
            let f = Frontier::with_capacity(&token, frontier_capacity(ORDER, BLOCK, WORKERS));
            std::thread::scope(|s| {
                for w in 0..WORKERS {
                    let f = &f;
                    s.spawn(move || {
                        let mut out = BlockWriter::new(f, BLOCK);
                        for n in (w..ORDER).step_by(WORKERS) {
                            out.push(n as Node);
                        }
                        out.finish();
                    });
                }
            });
            let used = f.head();
            assert!(used <= f.capacity());
            // SAFETY: all writers joined.
            let written = unsafe { f.slice(0..used) };
            let real: Vec<Node> = written.iter().copied().filter(|&n| n != SENTINEL).collect();
            assert_eq!(real.len(), ORDER);
            assert_eq!(real.iter().collect::<HashSet<_>>().len(), ORDER);
        });
    }

    #[test]
    #[should_panic(expected = "overflows frontier capacity")]
    fn undersized_buffer_panics() {
        GhostToken::new(|token| {
            let f = Frontier::with_capacity(&token, 5);
            let mut w = BlockWriter::new(&f, 4);
            for n in 0..5 {
                w.push(n);
            }
        });
    }

    #[test]
    #[should_panic(expected = "frontier capacity overflows")]
    fn capacity_overflow_is_a_contract_panic() {
        frontier_capacity(16, usize::MAX / 2, 4);
    }

    #[test]
    fn huge_read_block_is_clamped() {
        GhostToken::new(|token| {
            let mut f = Frontier::with_capacity(&token, 4);
            f.fill_from(&[1, 2]);
            f.head.store(usize::MAX - 1, Ordering::Relaxed);
            assert!(f.next_read_block(8).is_empty());
            f.reset_head();
            assert_eq!(f.next_read_block(usize::MAX), 0..2);
        });
    }

    #[test]
    fn pair_swaps_roles() {
        GhostToken::new(|token| {
            let pair = FrontierPair::new(&token, 8, &[3]);
            assert_eq!(pair.current().len(), 1);
            assert_eq!(pair.next().len(), 8);
            pair.swap();
            assert_eq!(pair.current().len(), 8);
            assert_eq!(pair.next().len(), 1);
        });
    }
}
