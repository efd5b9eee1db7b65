//! Bring-your-own-buffer LSD radix sort for node ids.
//!
//! Four stable 8-bit passes ping-pong between the input slice and a caller
//! supplied scratch slice. A pass whose digit is identical for every element
//! is skipped, so frontiers of small ids only pay for the low passes.
//! [`SENTINEL`](crate::graph::SENTINEL) is the largest id and always sorts last.

use crate::graph::Node;

const RADIX_BITS: usize = 8;
const BUCKETS: usize = 1 << RADIX_BITS;
const PASSES: usize = Node::BITS as usize / RADIX_BITS;

/// Below this length a comparison sort wins.
const SMALL: usize = 64;

/// Sorts `data` ascending, using `scratch[..data.len()]` as the second buffer.
///
/// The contents of `scratch` are clobbered.
///
/// # Panics
/// Panics if `scratch` is shorter than `data`.
pub fn radix_sort(data: &mut [Node], scratch: &mut [Node]) {
    let n = data.len();
    assert!(
        scratch.len() >= n,
        "scratch buffer too small: {} < {n}",
        scratch.len()
    );
    if n < SMALL {
        data.sort_unstable();
        return;
    }
    let scratch = &mut scratch[..n];

    let mut counts = [[0usize; BUCKETS]; PASSES];
    for &v in data.iter() {
        for (pass, count) in counts.iter_mut().enumerate() {
            count[digit(v, pass)] += 1;
        }
    }

    let mut in_scratch = false;
    for (pass, count) in counts.iter().enumerate() {
        if count.iter().any(|&c| c == n) {
            continue;
        }
        let mut starts = [0usize; BUCKETS];
        let mut sum = 0;
        for (start, &c) in starts.iter_mut().zip(count.iter()) {
            *start = sum;
            sum += c;
        }

        let (src, dst): (&[Node], &mut [Node]) = if in_scratch {
            (&*scratch, &mut *data)
        } else {
            (&*data, &mut *scratch)
        };
        for &v in src {
            let d = digit(v, pass);
            dst[starts[d]] = v;
            starts[d] += 1;
        }
        in_scratch = !in_scratch;
    }

    if in_scratch {
        data.copy_from_slice(scratch);
    }
}

#[inline(always)]
fn digit(v: Node, pass: usize) -> usize {
    ((v >> (pass * RADIX_BITS)) as usize) & (BUCKETS - 1)
}
