//! Errors surfaced while building or loading a graph.

use std::path::PathBuf;

use thiserror::Error;

use super::Node;

/// Errors that can occur while loading or validating a graph.
///
/// No partially built graph is ever returned alongside an error.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The binary input ended before a section was complete
    #[error("truncated {section}: expected {expected} bytes, found {actual}")]
    Truncated {
        /// Which part of the file was being read
        section: &'static str,
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// A declared length does not fit in memory on this platform
    #[error("declared {section} length {value} is too large")]
    LengthOverflow {
        /// Which length field overflowed
        section: &'static str,
        /// The declared value
        value: u64,
    },

    /// Bytes left over after the offsets array
    #[error("{0} unexpected trailing bytes after the offsets array")]
    TrailingBytes(usize),

    /// A text line is not a decimal unsigned integer
    #[error("line {line}: `{text}` is not a valid unsigned integer")]
    InvalidNumber {
        /// 1-based line number
        line: usize,
        /// Offending text
        text: String,
    },

    /// A text value of 0 cannot be converted from 1-based to 0-based
    #[error("line {line}: value 0 is not a valid 1-based index")]
    ZeroValue {
        /// 1-based line number
        line: usize,
    },

    /// The text input has no `-----` line between offsets and neighbors
    #[error("missing `-----` separator between offsets and neighbors")]
    MissingSeparator,

    /// The offsets array is empty (it needs at least one entry)
    #[error("offsets array is empty")]
    EmptyOffsets,

    /// The first offset is not zero
    #[error("first offset must be 0, found {0}")]
    FirstOffsetNonZero(u64),

    /// Offsets decrease somewhere
    #[error("offsets are not monotone at node {node}: {start} > {end}")]
    NonMonotonicOffsets {
        /// Node whose range is inverted
        node: usize,
        /// offsets[node]
        start: u64,
        /// offsets[node + 1]
        end: u64,
    },

    /// The final offset does not match the neighbor array length
    #[error("last offset {last} does not match neighbor count {neighbors}")]
    OffsetsMismatch {
        /// offsets[order]
        last: u64,
        /// neighbor array length
        neighbors: usize,
    },

    /// A neighbor id is not a node of the graph
    #[error("neighbor {node} at index {index} is out of bounds for order {order}")]
    NeighborOutOfRange {
        /// Position in the neighbor array
        index: usize,
        /// The offending id
        node: Node,
        /// Number of nodes
        order: usize,
    },

    /// The node count does not fit the 32-bit node id space (minus the sentinel)
    #[error("graph has {0} nodes, more than 32-bit node ids can address")]
    TooManyNodes(usize),

    /// The file extension is neither `.dat` nor `.txt`
    #[error("unknown graph file format: {}", .0.display())]
    UnknownFormat(PathBuf),
}

/// Result type for graph construction and loading.
pub type GraphResult<T> = Result<T, GraphError>;
