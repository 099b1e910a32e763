//! A single grid cell: four input pins, an op tag, and LUT parameters.

use crate::op::Op;
use crate::source::Source;
use bitgrid_common::Direction;
use serde::{Deserialize, Serialize};

/// The LUT configuration carried by a cell's `params` field.
///
/// Either `luts` (all four output tables) or `lut` (a single table applied
/// to output 0 only, with the remaining outputs implicitly zero) may be
/// present. A cell with neither evaluates as all-zero on every output,
/// matching the grid machine's "evaluation is total" failure semantics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellParams {
    /// Four 16-bit truth tables, one per output direction (N, E, S, W).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub luts: Option<[u16; 4]>,
    /// A single 16-bit truth table applied to output 0 only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lut: Option<u16>,
}

impl CellParams {
    /// Builds params from four explicit output LUTs.
    pub fn from_luts(luts: [u16; 4]) -> Self {
        Self {
            luts: Some(luts),
            lut: None,
        }
    }

    /// Builds params from a single LUT applied to output 0.
    pub fn from_single_lut(lut: u16) -> Self {
        Self {
            luts: None,
            lut: Some(lut),
        }
    }

    /// The four effective output LUTs: `luts` if present, otherwise `lut`
    /// placed on output 0 with the rest zero, otherwise all zero.
    pub fn effective_luts(&self) -> [u16; 4] {
        if let Some(luts) = self.luts {
            luts
        } else if let Some(lut) = self.lut {
            [lut, 0, 0, 0]
        } else {
            [0, 0, 0, 0]
        }
    }
}

/// A single grid cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The cell's x coordinate.
    pub x: u16,
    /// The cell's y coordinate.
    pub y: u16,
    /// The four input pins, ordered N, E, S, W. `None` means "unfilled",
    /// evaluated as a constant zero.
    pub inputs: [Option<Source>; 4],
    /// The informational operator tag.
    pub op: Op,
    /// LUT configuration for this cell.
    pub params: CellParams,
    /// Optional informational names for this cell's four outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_names: Option<Vec<String>>,
}

impl Cell {
    /// Creates a plain `LUT` cell at `(x, y)` with the given LUTs and no
    /// inputs wired yet.
    pub fn new_lut(x: u16, y: u16, luts: [u16; 4]) -> Self {
        Self {
            x,
            y,
            inputs: [None, None, None, None],
            op: Op::lut(),
            params: CellParams::from_luts(luts),
            out_names: None,
        }
    }

    /// Creates a zero-LUT placeholder cell, used when materializing a cell
    /// coordinate that a bitstream apply references but the Program lacks.
    pub fn zero_placeholder(x: u16, y: u16) -> Self {
        Self::new_lut(x, y, [0, 0, 0, 0])
    }

    /// Creates an empty `ROUTE4` cell at `(x, y)` with no LUTs or inputs
    /// assigned yet; the router fills these in incrementally as hops are
    /// merged onto it.
    pub fn new_route4(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            inputs: [None, None, None, None],
            op: Op::route4(),
            params: CellParams::default(),
            out_names: None,
        }
    }

    /// The source wired to a given input pin, if any.
    pub fn input(&self, dir: Direction) -> Option<&Source> {
        self.inputs[dir.index() as usize].as_ref()
    }

    /// Sets the source wired to a given input pin.
    pub fn set_input(&mut self, dir: Direction, source: Source) {
        self.inputs[dir.index() as usize] = Some(source);
    }

    /// The four effective output LUTs for this cell.
    pub fn effective_luts(&self) -> [u16; 4] {
        self.params.effective_luts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_luts_prefers_full_array() {
        let params = CellParams::from_luts([1, 2, 3, 4]);
        assert_eq!(params.effective_luts(), [1, 2, 3, 4]);
    }

    #[test]
    fn effective_luts_single_lut_on_output_zero() {
        let params = CellParams::from_single_lut(0xAAAA);
        assert_eq!(params.effective_luts(), [0xAAAA, 0, 0, 0]);
    }

    #[test]
    fn effective_luts_empty_is_zero() {
        let params = CellParams::default();
        assert_eq!(params.effective_luts(), [0, 0, 0, 0]);
    }

    #[test]
    fn input_accessors_use_direction_index() {
        let mut cell = Cell::new_lut(0, 0, [0, 0, 0, 0]);
        cell.set_input(
            Direction::E,
            Source::Input {
                name: "x".into(),
                bit: 0,
            },
        );
        assert!(cell.input(Direction::E).is_some());
        assert!(cell.input(Direction::N).is_none());
    }
}
