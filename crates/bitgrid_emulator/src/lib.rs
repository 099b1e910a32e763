//! Two evaluators over BitGrid programs: [`GridMachine`], a dense
//! positional LUT grid that communicates purely through committed
//! neighbor outputs, and [`Emulator`], a logical evaluator that
//! dereferences a `Program`'s symbolic `Source` graph directly.

#![warn(missing_docs)]

pub mod edge;
pub mod grid_machine;
pub mod logical;

pub use edge::{EdgeIn, EdgeOut};
pub use grid_machine::GridMachine;
pub use logical::Emulator;
