//! The dense runtime LUT configuration derived from a `Program`.

use crate::program::Program;
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A dense W×H array of four-LUT cells.
///
/// Unlike `Program`, every coordinate in a `LUTGrid` has a concrete LUT
/// value (implicitly all-zero where the source `Program` had no cell) —
/// this is the shape the grid machine and bitstream codec operate on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LUTGrid {
    width: u16,
    height: u16,
    cells: Vec<[u16; 4]>,
}

impl LUTGrid {
    /// Creates an all-zero grid of the given dimensions.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![[0u16; 4]; width as usize * height as usize],
        }
    }

    /// Derives a dense grid from a `Program`; coordinates with no placed
    /// cell default to all-zero LUTs.
    pub fn from_program(program: &Program) -> Self {
        let mut grid = Self::new(program.width, program.height);
        for cell in &program.cells {
            grid.set(cell.x, cell.y, cell.effective_luts());
        }
        grid
    }

    /// Grid width.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// The four LUTs at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the grid; callers are expected to
    /// bounds-check against `width()`/`height()` beforehand, as every
    /// internal caller does.
    pub fn get(&self, x: u16, y: u16) -> [u16; 4] {
        self.cells[self.index(x, y)]
    }

    /// Sets the four LUTs at `(x, y)`.
    pub fn set(&mut self, x: u16, y: u16, luts: [u16; 4]) {
        let idx = self.index(x, y);
        self.cells[idx] = luts;
    }

    /// Iterates every coordinate in row-major order with its LUTs.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, [u16; 4])> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, luts)| ((i % width as usize) as u16, (i / width as usize) as u16, *luts))
    }
}

#[derive(Serialize, Deserialize)]
struct WireCell {
    x: u16,
    y: u16,
    luts: [u16; 4],
}

#[derive(Serialize, Deserialize)]
struct WireGrid {
    format: String,
    width: u16,
    height: u16,
    cells: Vec<WireCell>,
}

impl Serialize for LUTGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let cells = self
            .iter()
            .filter(|(_, _, luts)| luts.iter().any(|&l| l != 0))
            .map(|(x, y, luts)| WireCell { x, y, luts })
            .collect();
        WireGrid {
            format: "lutgrid-v1".to_string(),
            width: self.width,
            height: self.height,
            cells,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LUTGrid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireGrid::deserialize(deserializer)?;
        if wire.format != "lutgrid-v1" {
            return Err(D::Error::custom(format!(
                "unsupported lutgrid format '{}'",
                wire.format
            )));
        }
        let mut grid = LUTGrid::new(wire.width, wire.height);
        for cell in wire.cells {
            if cell.x >= wire.width || cell.y >= wire.height {
                return Err(D::Error::custom(format!(
                    "cell ({}, {}) out of bounds for {}x{} grid",
                    cell.x, cell.y, wire.width, wire.height
                )));
            }
            grid.set(cell.x, cell.y, cell.luts);
        }
        Ok(grid)
    }
}
