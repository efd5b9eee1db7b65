//! The Graph View: an immutable CSR (compressed sparse row) adjacency structure,
//! its loaders, and the per-traversal membership structures built over it.
//!
//! - `csr`: [`CsrGraph`], node ids and the sentinel value
//! - `access`: visited set (exact claim) and cuckoo pre-filter (approximate)
//! - `io`: binary / text loaders and writers

pub mod access;
pub mod csr;
pub mod error;
pub mod io;

pub use csr::{CsrGraph, Node, SENTINEL};
pub use error::GraphError;
