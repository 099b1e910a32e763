//! Read-only dependency analysis over a `Program`'s cell graph: topological
//! ordering, level assignment, and a critical-path sizing estimate. Used by
//! mappers and test tooling, never by the routing or physicalization
//! passes themselves.

#![warn(missing_docs)]

pub mod dag;
pub mod error;

pub use dag::{critical_path_length, levels, topo_order};
pub use error::DagError;
