//! Errors raised by dependency analysis.

/// Failures from [`crate::dag::topo_order`] and the analyses built on it.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DagError {
    /// The cell graph contains a cycle of `Cell`-typed input sources.
    #[error("cell dependency graph contains a cycle")]
    Cycle,
}
