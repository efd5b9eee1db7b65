//! Parallel Expand with threads spawned per level.
//!
//! Workers share the reservation cursors of the Frontier Pair, but everything
//! between two levels (sort, sentinel trim, labeling, swap) runs on the calling
//! thread after the workers are joined.

use std::thread;

use super::engine::TraversalSummary;
use super::frontier::{frontier_capacity, BlockWriter, Frontier};
use super::levels::Level;
use super::sort::radix_sort;
use crate::config::DEFAULT_BLOCK;
use crate::graph::access::VisitedSet;
use crate::graph::{CsrGraph, Node, SENTINEL};
use crate::GhostToken;

/// Level assignment with `workers` threads per level.
///
/// # Panics
/// Panics if `levels.len() != graph.order()`, `source` is out of range or
/// `workers == 0`.
pub fn breadth_first(graph: &CsrGraph, source: Node, levels: &mut [Level], workers: usize) -> TraversalSummary {
    super::check_contract(graph, source, levels);
    assert!(workers != 0, "workers must be > 0");

    GhostToken::new(|token| {
        let order = graph.order();
        let visited = VisitedSet::new(&token, order);
        let capacity = frontier_capacity(order, DEFAULT_BLOCK, workers);
        let mut current = Frontier::with_capacity(&token, capacity);
        let mut next = Frontier::with_capacity(&token, capacity);

        visited.try_claim(source);
        levels[source as usize] = 1;
        current.fill_from(&[source]);

        let mut level: Level = 2;
        while !current.is_empty() {
            thread::scope(|s| {
                for _ in 0..workers {
                    s.spawn(|| expand(graph, &visited, &current, &next));
                }
            });

            let used = next.head();
            radix_sort(next.prefix_mut(used), current.prefix_mut(used));
            let written = next.prefix_mut(used);
            let real = written.partition_point(|&n| n != SENTINEL);
            for &node in &written[..real] {
                levels[node as usize] = level;
            }

            next.set_len(real);
            next.reset_head();
            core::mem::swap(&mut current, &mut next);
            next.set_len(next.capacity());
            next.reset_head();
            level += 1;
        }

        TraversalSummary {
            depth: level - 2,
            reached: visited.claimed(),
        }
    })
}

fn expand<'brand>(graph: &CsrGraph, visited: &VisitedSet<'brand>, current: &Frontier<'brand>, next: &Frontier<'brand>) {
    let mut out = BlockWriter::new(next, DEFAULT_BLOCK);
    loop {
        let block = current.next_read_block(DEFAULT_BLOCK);
        if block.is_empty() {
            break;
        }
        // SAFETY: `current` is read-only while workers run.
        for &node in unsafe { current.slice(block) } {
            for &neighbor in graph.neighbors(node) {
                if visited.try_claim(neighbor) {
                    out.push(neighbor);
                }
            }
        }
    }
    out.finish();
}
