//! The dense LUT grid abstract machine: a `width` x `height` array of
//! 4-input/4-output cells, advanced one checkerboard phase at a time.

use crate::edge::{EdgeIn, EdgeOut};
use bitgrid_common::Direction;
use bitgrid_ir::LUTGrid;

/// A physical BitGrid: a dense LUT configuration plus the committed output
/// state of every cell, stepped one phase at a time.
///
/// Neighbors communicate purely through the most recently committed
/// output on their shared edge — there is no `Source` graph here, only
/// positional adjacency. This is the machine a physicalized `Program`
/// ultimately reduces to.
pub struct GridMachine {
    luts: LUTGrid,
    outputs: Vec<[u8; 4]>,
    cycle: u64,
}

impl GridMachine {
    /// Creates a machine over `luts`, with every cell's output state at 0
    /// and the cycle counter at 0.
    pub fn new(luts: LUTGrid) -> Self {
        let count = luts.width() as usize * luts.height() as usize;
        Self {
            luts,
            outputs: vec![[0u8; 4]; count],
            cycle: 0,
        }
    }

    /// Grid width.
    pub fn width(&self) -> u16 {
        self.luts.width()
    }

    /// Grid height.
    pub fn height(&self) -> u16 {
        self.luts.height()
    }

    /// The current cycle counter (number of `step()` calls so far).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The four committed outputs of the cell at `(x, y)`.
    pub fn outputs_at(&self, x: u16, y: u16) -> [u8; 4] {
        self.outputs[self.index(x, y)]
    }

    /// Replaces the LUT configuration in place (e.g. after a bitstream
    /// reload) and resets all output state and the cycle counter.
    pub fn reload(&mut self, luts: LUTGrid) {
        let count = luts.width() as usize * luts.height() as usize;
        self.luts = luts;
        self.outputs = vec![[0u8; 4]; count];
        self.cycle = 0;
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width() as usize + x as usize
    }

    /// Advances one subcycle (phase). The active parity is `even` iff
    /// `cycle % 2 == 0`. Every cell of that parity gathers its four
    /// inputs from the neighbors' (or `edge_in`'s) previously committed
    /// state, computes its four outputs by indexing its LUTs, and all
    /// active-parity updates are committed together after every read —
    /// cells of the inactive parity are untouched. Returns the boundary
    /// outputs after the commit.
    pub fn step(&mut self, edge_in: &EdgeIn) -> EdgeOut {
        let width = self.width();
        let height = self.height();
        let active_even = self.cycle % 2 == 0;
        let mut next = self.outputs.clone();

        for y in 0..height {
            for x in 0..width {
                let is_even = (x as u32 + y as u32) % 2 == 0;
                if is_even != active_even {
                    continue;
                }
                let mut bits = [0u8; 4];
                for dir in Direction::ALL {
                    let (dx, dy) = dir.step();
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    bits[dir.index() as usize] = if nx >= 0 && ny >= 0 && (nx as u16) < width && (ny as u16) < height {
                        let neighbor = self.outputs[self.index(nx as u16, ny as u16)];
                        neighbor[dir.opposite().index() as usize]
                    } else {
                        let pos = match dir {
                            Direction::N | Direction::S => x,
                            Direction::E | Direction::W => y,
                        };
                        edge_in.bit(dir, pos)
                    };
                }
                let idx = bits[0] as u16
                    | (bits[1] as u16) << 1
                    | (bits[2] as u16) << 2
                    | (bits[3] as u16) << 3;
                let luts = self.luts.get(x, y);
                next[self.index(x, y)] = [
                    ((luts[0] >> idx) & 1) as u8,
                    ((luts[1] >> idx) & 1) as u8,
                    ((luts[2] >> idx) & 1) as u8,
                    ((luts[3] >> idx) & 1) as u8,
                ];
            }
        }

        self.outputs = next;
        self.cycle += 1;

        EdgeOut {
            n: (0..width).map(|x| self.outputs[self.index(x, 0)][0]).collect(),
            e: (0..height)
                .map(|y| self.outputs[self.index(width - 1, y)][1])
                .collect(),
            s: (0..width)
                .map(|x| self.outputs[self.index(x, height - 1)][2])
                .collect(),
            w: (0..height).map(|y| self.outputs[self.index(0, y)][3]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass_through_grid(width: u16, height: u16, out_dir: Direction, in_pin: Direction) -> LUTGrid {
        let mut grid = LUTGrid::new(width, height);
        let mask = bitgrid_router_test_support::pass_through_mask(in_pin);
        for y in 0..height {
            for x in 0..width {
                let mut luts = [0u16; 4];
                luts[out_dir.index() as usize] = mask;
                grid.set(x, y, luts);
            }
        }
        grid
    }

    // Mirrors bitgrid_router::lut::pass_through_mask without taking a
    // dependency on that crate from this one.
    mod bitgrid_router_test_support {
        use bitgrid_common::Direction;

        pub fn pass_through_mask(in_pin: Direction) -> u16 {
            let shift = in_pin.index();
            let mut mask = 0u16;
            for idx in 0..16u16 {
                if (idx >> shift) & 1 == 1 {
                    mask |= 1 << idx;
                }
            }
            mask
        }
    }

    #[test]
    fn edge_in_propagates_into_grid() {
        // Every cell passes its W input straight to its E output.
        let grid = pass_through_grid(2, 2, Direction::E, Direction::W);
        let mut machine = GridMachine::new(grid);
        let mut edge_in = EdgeIn::empty();
        edge_in.set(Direction::W, 0, 1);
        edge_in.set(Direction::W, 1, 0);

        // cycle 0 is phase A (even cells: (0,0) and (1,1)).
        machine.step(&edge_in);
        assert_eq!(machine.outputs_at(0, 0)[Direction::E.index() as usize], 1);
        // (1,1) reads its W neighbor (0,1), which is odd parity and still
        // at its initial zero output this phase.
        assert_eq!(machine.outputs_at(1, 1)[Direction::E.index() as usize], 0);
    }

    #[test]
    fn inactive_parity_cells_are_untouched_by_a_step() {
        let grid = pass_through_grid(2, 2, Direction::E, Direction::W);
        let mut machine = GridMachine::new(grid);
        let edge_in = EdgeIn::empty();
        let before = machine.outputs_at(1, 0);
        machine.step(&edge_in); // phase A: only (0,0) and (1,1) update.
        assert_eq!(machine.outputs_at(1, 0), before);
    }

    #[test]
    fn edge_out_reads_expected_rows_and_columns() {
        let grid = pass_through_grid(2, 2, Direction::S, Direction::N);
        let mut machine = GridMachine::new(grid);
        let mut edge_in = EdgeIn::empty();
        edge_in.set(Direction::N, 0, 1);
        edge_in.set(Direction::N, 1, 1);
        let out = machine.step(&edge_in);
        assert_eq!(out.n.len(), 2);
        assert_eq!(out.e.len(), 2);
        assert_eq!(out.s.len(), 2);
        assert_eq!(out.w.len(), 2);
    }

    #[test]
    fn reload_resets_outputs_and_cycle() {
        let grid = pass_through_grid(2, 2, Direction::E, Direction::W);
        let mut machine = GridMachine::new(grid.clone());
        machine.step(&EdgeIn::empty());
        assert_eq!(machine.cycle(), 1);
        machine.reload(grid);
        assert_eq!(machine.cycle(), 0);
        assert_eq!(machine.outputs_at(0, 0), [0, 0, 0, 0]);
    }
}
