//! A compact CSR (compressed sparse row) graph.
//!
//! CSR is the standard sparse matrix format for graphs, storing edges in row-major order.
//! This provides efficient access to outgoing edges and is the layout every
//! traversal variant in this crate reads.
//!
//! Memory layout:
//! - `offsets`: `Vec<u64>` of length `n + 1` (row offsets, monotone, `offsets[0] == 0`)
//! - `neighbors`: contiguous `u32` targets for each row

use super::{error::GraphResult, GraphError};

/// Node identifier in `[0, order)`.
pub type Node = u32;

/// Reserved node value padding unused write reservations in a frontier.
///
/// Never a valid node: graphs with `order >= SENTINEL` are rejected.
pub const SENTINEL: Node = Node::MAX;

/// An immutable CSR graph. Shared read-only by every worker of every traversal.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `from_adjacency` | \(O(n + m)\) | Builds CSR from adjacency list |
/// | `try_from_csr_parts` | \(O(n + m)\) | Validates offsets and neighbor ids |
/// | `neighbors` | \(O(1)\) | Returns a slice of outgoing neighbors |
/// | `degree` | \(O(1)\) | Returns out-degree |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrGraph {
    offsets: Vec<u64>,
    neighbors: Vec<Node>,
}

impl CsrGraph {
    /// Builds a graph from CSR parts, validating every structural invariant.
    ///
    /// # Errors
    /// Returns a [`GraphError`] if `offsets` is empty, does not start at 0, is not
    /// monotone, does not end at `neighbors.len()`, if any neighbor id is
    /// `>= order`, or if the order does not fit in [`Node`].
    pub fn try_from_csr_parts(offsets: Vec<u64>, neighbors: Vec<Node>) -> GraphResult<Self> {
        let Some(&first) = offsets.first() else {
            return Err(GraphError::EmptyOffsets);
        };
        if first != 0 {
            return Err(GraphError::FirstOffsetNonZero(first));
        }
        let order = offsets.len() - 1;
        if order >= SENTINEL as usize {
            return Err(GraphError::TooManyNodes(order));
        }
        for (node, w) in offsets.windows(2).enumerate() {
            if w[0] > w[1] {
                return Err(GraphError::NonMonotonicOffsets {
                    node,
                    start: w[0],
                    end: w[1],
                });
            }
        }
        let last = offsets[order];
        if last != neighbors.len() as u64 {
            return Err(GraphError::OffsetsMismatch {
                last,
                neighbors: neighbors.len(),
            });
        }
        if let Some((index, &node)) = neighbors
            .iter()
            .enumerate()
            .find(|&(_, &v)| v as usize >= order)
        {
            return Err(GraphError::NeighborOutOfRange { index, node, order });
        }
        Ok(Self { offsets, neighbors })
    }

    /// Builds a graph directly from CSR parts.
    ///
    /// # Panics
    /// Panics on any invariant violation listed in
    /// [`try_from_csr_parts`](Self::try_from_csr_parts); handing malformed parts
    /// to this constructor is a programming error.
    pub fn from_csr_parts(offsets: Vec<u64>, neighbors: Vec<Node>) -> Self {
        match Self::try_from_csr_parts(offsets, neighbors) {
            Ok(graph) => graph,
            Err(err) => panic!("invalid CSR parts: {err}"),
        }
    }

    /// Builds a CSR graph from an adjacency list.
    ///
    /// # Panics
    ///
    /// Panics if any edge references a node index out of bounds.
    pub fn from_adjacency(adjacency: &[Vec<Node>]) -> Self {
        let n = adjacency.len();

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0u64);

        let mut total_edges = 0u64;
        for nbrs in adjacency {
            total_edges += nbrs.len() as u64;
            offsets.push(total_edges);
        }

        let mut neighbors = Vec::with_capacity(total_edges as usize);
        for (u, nbrs) in adjacency.iter().enumerate() {
            for &v in nbrs {
                assert!((v as usize) < n, "edge {u}->{v} is out of bounds for n={n}");
                neighbors.push(v);
            }
        }

        Self::from_csr_parts(offsets, neighbors)
    }

    /// Builds a symmetric graph from undirected edges; each edge is stored in
    /// both directions, in input order.
    ///
    /// # Panics
    /// Panics if any endpoint is `>= order`.
    pub fn from_undirected_edges(order: usize, edges: &[(Node, Node)]) -> Self {
        let mut adjacency = vec![Vec::new(); order];
        for &(a, b) in edges {
            assert!((a as usize) < order && (b as usize) < order, "edge {a}-{b} is out of bounds for n={order}");
            adjacency[a as usize].push(b);
            adjacency[b as usize].push(a);
        }
        Self::from_adjacency(&adjacency)
    }

    /// Number of nodes.
    #[inline]
    pub fn order(&self) -> usize {
        // `offsets` is length `n + 1` by construction.
        self.offsets.len() - 1
    }

    /// Number of directed edges (length of the neighbor array).
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns the out-neighbors of `node`: `list[offsets[node]..offsets[node + 1]]`.
    ///
    /// # Panics
    /// Panics if `node >= order()`.
    #[inline]
    pub fn neighbors(&self, node: Node) -> &[Node] {
        let n = node as usize;
        assert!(n < self.order(), "node {node} out of bounds");
        let start = self.offsets[n] as usize;
        let end = self.offsets[n + 1] as usize;
        &self.neighbors[start..end]
    }

    /// Returns the out-degree of a node.
    #[inline]
    pub fn degree(&self, node: Node) -> usize {
        self.neighbors(node).len()
    }

    /// Raw offsets array (length `order() + 1`).
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Raw flat neighbor array.
    pub fn neighbor_list(&self) -> &[Node] {
        &self.neighbors
    }
}
