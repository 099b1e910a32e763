//! A minimal distributed two-phase barrier over 4-neighbor links, used by
//! multi-tile demos and servers to synchronize seam exchange at the
//! granularity of `(epoch, phase)`.

#![warn(missing_docs)]

pub mod barrier;

pub use barrier::{BarrierState, MarkOutcome, NeighborBarrier, Phase};
