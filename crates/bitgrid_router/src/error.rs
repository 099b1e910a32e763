//! Routing failure modes.

use bitgrid_common::Direction;
use thiserror::Error;

/// Failure modes produced while routing or merging `ROUTE4` hops.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// A* search exhausted the open set without reaching the destination.
    #[error("no route found from ({src_x}, {src_y}) to ({dst_x}, {dst_y})")]
    NoPath {
        /// Source x.
        src_x: u16,
        /// Source y.
        src_y: u16,
        /// Destination x.
        dst_x: u16,
        /// Destination y.
        dst_y: u16,
    },
    /// A reconstructed path stepped between two cells that are not
    /// orthogonally adjacent. Indicates a bug in path reconstruction.
    #[error("non-adjacent hop encountered at ({x}, {y})")]
    NonAdjacentHop {
        /// Cell x.
        x: u16,
        /// Cell y.
        y: u16,
    },
    /// A `ROUTE4` cell's output direction is already assigned to a
    /// different mapping than the one being merged in.
    #[error("ROUTE4 output {dir} already assigned at ({x}, {y})")]
    OutputConflict {
        /// Cell x.
        x: u16,
        /// Cell y.
        y: u16,
        /// The conflicting output direction.
        dir: Direction,
    },
    /// A `ROUTE4` cell's input pin is already wired to a different
    /// upstream source than the one being merged in.
    #[error("ROUTE4 input pin {dir} already used at ({x}, {y})")]
    InputConflict {
        /// Cell x.
        x: u16,
        /// Cell y.
        y: u16,
        /// The conflicting input pin.
        dir: Direction,
    },
}
