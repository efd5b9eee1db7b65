//! Sequential BFS over the bitset visited set, with each new frontier radix
//! sorted so the next level walks the adjacency arrays in ascending order.

use super::engine::TraversalSummary;
use super::levels::Level;
use super::sort::radix_sort;
use crate::graph::access::VisitedSet;
use crate::graph::{CsrGraph, Node};
use crate::GhostToken;

/// Sequential sorted-frontier level assignment.
///
/// # Panics
/// Panics if `levels.len() != graph.order()` or `source` is out of range.
pub fn breadth_first(graph: &CsrGraph, source: Node, levels: &mut [Level]) -> TraversalSummary {
    super::check_contract(graph, source, levels);

    GhostToken::new(|token| {
        let order = graph.order();
        let visited = VisitedSet::new(&token, order);
        let mut current = Vec::with_capacity(order);
        let mut next = Vec::with_capacity(order);
        let mut spare = vec![0; order];

        visited.try_claim(source);
        levels[source as usize] = 1;
        current.push(source);

        let mut level: Level = 2;
        while !current.is_empty() {
            for &node in &current {
                for &neighbor in graph.neighbors(node) {
                    if visited.try_claim(neighbor) {
                        levels[neighbor as usize] = level;
                        next.push(neighbor);
                    }
                }
            }
            radix_sort(&mut next, &mut spare);

            level += 1;
            current.clear();
            core::mem::swap(&mut current, &mut next);
        }

        TraversalSummary {
            depth: level - 2,
            reached: visited.claimed(),
        }
    })
}
