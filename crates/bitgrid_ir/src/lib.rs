//! The logical data model shared by every BitGrid component: `Program`,
//! `Cell`, `Source`, and the dense `LUTGrid` configuration derived from them.
//!
//! This crate has no knowledge of routing, physicalization, evaluation, or
//! the wire/bitstream formats — it only defines the shapes those components
//! operate on and the structural invariants a well-formed `Program` upholds.

#![warn(missing_docs)]

pub mod cell;
pub mod error;
pub mod lutgrid;
pub mod op;
pub mod program;
pub mod source;

pub use bitgrid_common::Direction;
pub use cell::{Cell, CellParams};
pub use error::ProgramError;
pub use lutgrid::LUTGrid;
pub use op::Op;
pub use program::{manhattan_distance, Program};
pub use source::Source;
