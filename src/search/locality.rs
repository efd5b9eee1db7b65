//! The Locality Pass: per-chunk sort and labeling of a freshly built frontier.
//!
//! The next frontier is split into `parts` contiguous chunks of
//! `ceil(len / parts)` entries. Each chunk is radix sorted on its own, so
//! ordering is local to a chunk and never global. Sorting moves the sentinel
//! padding to the tail of each chunk, and labeling stops at the first one.
//!
//! This is the only place a parallel traversal writes the level array.

use core::ops::Range;

use super::levels::{Level, LevelSink};
use super::sort::radix_sort;
use crate::graph::{Node, SENTINEL};

/// The chunk of a `len`-entry frontier owned by `part` out of `parts`.
///
/// Chunks are disjoint, cover `0..len`, and trailing parts may be empty.
#[inline]
pub fn chunk_range(len: usize, parts: usize, part: usize) -> Range<usize> {
    debug_assert!(part < parts);
    let size = len.div_ceil(parts);
    let start = (part * size).min(len);
    let end = (start + size).min(len);
    start..end
}

/// Sorts `chunk` (using `scratch` as the second buffer) and labels every real
/// node in it with `level`. Returns the number of labeled nodes.
pub(crate) fn sort_and_label(
    chunk: &mut [Node],
    scratch: &mut [Node],
    sink: &LevelSink<'_>,
    level: Level,
) -> usize {
    radix_sort(chunk, scratch);
    label_sorted(chunk, sink, level)
}

/// Labels a sorted chunk up to its first sentinel.
pub(crate) fn label_sorted(chunk: &[Node], sink: &LevelSink<'_>, level: Level) -> usize {
    let real = chunk.partition_point(|&n| n != SENTINEL);
    for &node in &chunk[..real] {
        sink.set(node as usize, level);
    }
    real
}
