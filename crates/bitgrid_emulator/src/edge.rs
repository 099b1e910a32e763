//! Boundary values fed into and read out of a [`crate::grid_machine::GridMachine`] step.

use bitgrid_common::Direction;
use std::collections::HashMap;

/// Sparse per-edge input bits for one `step()` call. A position with no
/// entry defaults to 0. Positions are indexed by x for the N/S edges and
/// by y for the E/W edges.
#[derive(Clone, Debug, Default)]
pub struct EdgeIn {
    n: HashMap<u16, u8>,
    e: HashMap<u16, u8>,
    s: HashMap<u16, u8>,
    w: HashMap<u16, u8>,
}

impl EdgeIn {
    /// An edge input with nothing driven (every position reads as 0).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the bit driven at `side`, position `pos`.
    pub fn set(&mut self, side: Direction, pos: u16, bit: u8) {
        let map = match side {
            Direction::N => &mut self.n,
            Direction::E => &mut self.e,
            Direction::S => &mut self.s,
            Direction::W => &mut self.w,
        };
        map.insert(pos, bit & 1);
    }

    /// The bit driven at `side`, position `pos`, or 0 if undriven.
    pub fn bit(&self, side: Direction, pos: u16) -> u8 {
        let map = match side {
            Direction::N => &self.n,
            Direction::E => &self.e,
            Direction::S => &self.s,
            Direction::W => &self.w,
        };
        map.get(&pos).copied().unwrap_or(0)
    }
}

/// The boundary outputs produced by one `step()` call: N edge reads
/// output 0 of row 0, E edge output 1 of column `width - 1`, S edge
/// output 2 of row `height - 1`, W edge output 3 of column 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeOut {
    /// Output 0 of every cell in row 0, indexed by x.
    pub n: Vec<u8>,
    /// Output 1 of every cell in column `width - 1`, indexed by y.
    pub e: Vec<u8>,
    /// Output 2 of every cell in row `height - 1`, indexed by x.
    pub s: Vec<u8>,
    /// Output 3 of every cell in column 0, indexed by y.
    pub w: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undriven_position_reads_zero() {
        let edge = EdgeIn::empty();
        assert_eq!(edge.bit(Direction::N, 0), 0);
    }

    #[test]
    fn set_then_get_round_trip() {
        let mut edge = EdgeIn::empty();
        edge.set(Direction::W, 3, 1);
        assert_eq!(edge.bit(Direction::W, 3), 1);
        assert_eq!(edge.bit(Direction::W, 4), 0);
    }
}
