//! Branded visited set for graph traversals.
//!
//! Word-packed atomics (`GhostAtomicBitset`) over node ids: the single source of
//! truth for frontier deduplication. A node enters a frontier only through a
//! successful [`VisitedSet::try_claim`], and exactly one caller wins each node.

use crate::concurrency::atomic::GhostAtomicBitset;
use crate::graph::Node;
use crate::GhostToken;

/// A dense, word-packed visited set for fixed-size graphs.
pub struct VisitedSet<'brand> {
    bits: GhostAtomicBitset<'brand>,
}

impl<'brand> VisitedSet<'brand> {
    /// Creates an empty set over `[0, order)`.
    pub fn new(token: &GhostToken<'brand>, order: usize) -> Self {
        Self {
            bits: GhostAtomicBitset::new(token, order),
        }
    }

    /// Number of nodes covered.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bits.len_bits()
    }

    /// Returns `true` if the set covers no nodes.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` iff this call observed the node as unclaimed and claimed it.
    ///
    /// Claims are `Relaxed`: exclusivity follows from the total order of RMWs on
    /// the word, and publication of whatever the winner writes afterwards is
    /// ordered by the phase handoff.
    #[inline(always)]
    pub fn try_claim(&self, node: Node) -> bool {
        self.bits.try_claim(node as usize)
    }

    /// Loads the bitset words for four candidates at once.
    ///
    /// Issuing the four loads back to back lets their cache misses overlap; pair
    /// each word with [`try_claim_from`](Self::try_claim_from).
    #[inline(always)]
    pub fn load_words4(&self, nodes: [Node; 4]) -> [usize; 4] {
        [
            self.bits.load_word(nodes[0] as usize),
            self.bits.load_word(nodes[1] as usize),
            self.bits.load_word(nodes[2] as usize),
            self.bits.load_word(nodes[3] as usize),
        ]
    }

    /// Claims `node` starting from a previously loaded word.
    ///
    /// Same contract as [`try_claim`](Self::try_claim).
    #[inline(always)]
    pub fn try_claim_from(&self, observed: usize, node: Node) -> bool {
        self.bits.try_claim_from(observed, node as usize)
    }

    /// Exact, read-only membership check.
    #[inline(always)]
    pub fn is_claimed(&self, node: Node) -> bool {
        self.bits.is_set(node as usize)
    }

    /// Number of claimed nodes. Only meaningful once the traversal has quiesced.
    pub fn claimed(&self) -> usize {
        self.bits.count_ones()
    }
}
