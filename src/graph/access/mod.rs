//! Per-traversal graph accessors.
//!
//! Both structures are branded with the traversal's token, sized to the
//! graph's order, and only ever grow (no bit or fingerprint is removed while a
//! traversal is running).

pub mod filter;
pub mod visited;

pub use filter::CuckooFilter;
pub use visited::VisitedSet;
