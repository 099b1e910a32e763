//! Errors surfaced when validating a `Program`.

use thiserror::Error;

/// Configuration problems a `Program` can fail to satisfy.
///
/// These are user-input problems (a malformed or hand-edited Program JSON
/// document), not internal bugs — see `bitgrid_common::InternalError` for
/// the latter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    /// Grid width or height is odd; both must be even per the spec.
    #[error("grid dimensions must be even, got {width}x{height}")]
    OddDimensions {
        /// The offending width.
        width: u16,
        /// The offending height.
        height: u16,
    },

    /// A cell's coordinate lies outside the declared grid dimensions.
    #[error("cell ({x}, {y}) is out of bounds for a {width}x{height} grid")]
    OutOfBounds {
        /// The cell's x coordinate.
        x: u16,
        /// The cell's y coordinate.
        y: u16,
        /// The grid width.
        width: u16,
        /// The grid height.
        height: u16,
    },

    /// Two cells were declared at the same coordinate.
    #[error("duplicate cell at ({x}, {y})")]
    DuplicateCell {
        /// The duplicated x coordinate.
        x: u16,
        /// The duplicated y coordinate.
        y: u16,
    },

    /// A `Cell`-typed source references a coordinate with no cell there.
    #[error("source at ({x}, {y}) references no such cell")]
    DanglingCellSource {
        /// The referenced x coordinate.
        x: u16,
        /// The referenced y coordinate.
        y: u16,
    },
}
