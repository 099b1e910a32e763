//! The Manhattan router: inserts `ROUTE4` hops so that every cell input
//! reads from an orthogonally adjacent neighbor.

use crate::astar::{self, Occupancy};
use crate::error::RouteError;
use crate::lut::route_luts;
use bitgrid_common::Direction;
use bitgrid_ir::{Cell, Program, Source};
use std::collections::{HashMap, HashSet};

/// Routes signals across a fixed-size grid by inserting pass-through
/// `ROUTE4` cells along Manhattan paths.
///
/// A single router instance accumulates state across a whole routing
/// pass: cells it creates are tracked in `route_cells` so that later hops
/// landing on the same coordinate merge into the same cell rather than
/// overwriting it, and `occ` is updated as hops are placed so later
/// searches route around them.
pub struct ManhattanRouter {
    width: u16,
    height: u16,
    occ: Vec<bool>,
    route_cells: HashMap<(u16, u16), Cell>,
    edge_fanout_index: HashMap<(Direction, u16), u32>,
}

impl Occupancy for ManhattanRouter {
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u16) < self.width && (y as u16) < self.height
    }

    fn passable(&self, x: u16, y: u16) -> bool {
        !self.occ[self.idx(x, y)] || self.route_cells.contains_key(&(x, y))
    }
}

impl ManhattanRouter {
    /// Creates a router over an empty `width` x `height` grid.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            occ: vec![false; width as usize * height as usize],
            route_cells: HashMap::new(),
            edge_fanout_index: HashMap::new(),
        }
    }

    /// Creates a router whose occupancy grid already reflects every cell
    /// placed in `program`.
    pub fn with_occupied_from_program(program: &Program) -> Self {
        let mut router = Self::new(program.width, program.height);
        for cell in &program.cells {
            router.occupy(cell.x, cell.y);
        }
        router
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Marks `(x, y)` as occupied, excluding it from future paths unless
    /// it becomes a shareable `ROUTE4` cell.
    pub fn occupy(&mut self, x: u16, y: u16) {
        let idx = self.idx(x, y);
        self.occ[idx] = true;
    }

    /// Returns `true` if `(x, y)` is unoccupied.
    pub fn is_free(&self, x: u16, y: u16) -> bool {
        !self.occ[self.idx(x, y)]
    }

    /// The boundary cell for `(side, pos)`: `pos` indexes along the side
    /// (x for N/S, y for E/W).
    pub fn edge_cell(&self, side: Direction, pos: u16) -> (u16, u16) {
        match side {
            Direction::N => (pos, 0),
            Direction::S => (pos, self.height - 1),
            Direction::W => (0, pos),
            Direction::E => (self.width - 1, pos),
        }
    }

    /// Finds a 4-neighbor path from `src` to `dst`, excluding `src`.
    pub fn route(
        &self,
        src: (u16, u16),
        dst: (u16, u16),
        turn_penalty: f64,
        avoid_moves: Option<&HashSet<(u16, u16, Direction)>>,
    ) -> Result<Vec<(u16, u16)>, RouteError> {
        astar::route(self, src, dst, turn_penalty, avoid_moves, None)
    }

    /// Every `ROUTE4` cell this router has created or merged into so far,
    /// in their final (possibly merged) form.
    pub fn new_cells(&self) -> Vec<Cell> {
        self.route_cells.values().cloned().collect()
    }

    /// Ensures a `ROUTE4` cell exists at `(x, y)` mapping `in_pin` through
    /// to `out_dir`, merging into an existing cell from this pass when
    /// possible. Fails if the output is already assigned a different
    /// mapping, or the input pin already carries a different upstream.
    pub fn add_or_merge_route4(
        &mut self,
        x: u16,
        y: u16,
        out_dir: Direction,
        in_pin: Direction,
        upstream: Source,
    ) -> Result<(), RouteError> {
        let mask = route_luts(out_dir, in_pin)[out_dir.index() as usize];
        let cell = self
            .route_cells
            .entry((x, y))
            .or_insert_with(|| Cell::new_route4(x, y));

        let out_idx = out_dir.index() as usize;
        let current_luts = cell.effective_luts();
        if current_luts[out_idx] != 0 {
            let matches_mask = current_luts[out_idx] == mask;
            let matches_upstream = cell.input(in_pin) == Some(&upstream);
            if matches_mask && matches_upstream {
                self.occ[y as usize * self.width as usize + x as usize] = true;
                return Ok(());
            }
            return Err(RouteError::OutputConflict { x, y, dir: out_dir });
        }

        if let Some(existing) = cell.input(in_pin).cloned() {
            if existing != upstream {
                return Err(RouteError::InputConflict { x, y, dir: in_pin });
            }
        }
        let mut luts = current_luts;
        luts[out_idx] = mask;
        cell.params = bitgrid_ir::CellParams::from_luts(luts);
        cell.set_input(in_pin, upstream);

        let idx = y as usize * self.width as usize + x as usize;
        self.occ[idx] = true;
        Ok(())
    }

    /// Routes from `src` to `dst`, creating/merging a `ROUTE4` cell at
    /// every intermediate coordinate up to and including `dst` itself.
    /// Returns the direction of the last hop taken.
    pub fn wire_with_route4(
        &mut self,
        src: (u16, u16),
        src_out: u8,
        dst: (u16, u16),
    ) -> Result<Direction, RouteError> {
        let path = self.route(src, dst, 0.0, None)?;
        let mut prev_src = Source::Cell {
            x: src.0,
            y: src.1,
            out: src_out,
        };
        let mut cur = src;
        let mut last_dir = Direction::E;
        for hop in path {
            let direction = Direction::between(cur.0 as i32, cur.1 as i32, hop.0 as i32, hop.1 as i32)
                .ok_or(RouteError::NonAdjacentHop { x: hop.0, y: hop.1 })?;
            self.add_or_merge_route4(hop.0, hop.1, direction, direction.opposite(), prev_src)?;
            prev_src = Source::Cell {
                x: hop.0,
                y: hop.1,
                out: direction.index(),
            };
            last_dir = direction;
            cur = hop;
        }
        Ok(last_dir)
    }

    /// Routes from `src` to a neighbor of `dst`, stopping one hop short so
    /// the caller can wire the final hop's output directly into `dst`'s
    /// input pin. Returns the direction facing `dst` and the coordinate of
    /// that last hop.
    pub fn wire_adjacent_to(
        &mut self,
        src: (u16, u16),
        src_out: u8,
        dst: (u16, u16),
    ) -> Result<(Direction, (u16, u16)), RouteError> {
        let path = self.route(src, dst, 0.0, None)?;
        if path.is_empty() {
            return Ok((Direction::E, src));
        }
        let hops = &path[..path.len() - 1];

        let mut prev_src = Source::Cell {
            x: src.0,
            y: src.1,
            out: src_out,
        };
        let mut cur = src;
        let mut last_dir = Direction::E;
        for &hop in hops {
            let direction = Direction::between(cur.0 as i32, cur.1 as i32, hop.0 as i32, hop.1 as i32)
                .ok_or(RouteError::NonAdjacentHop { x: hop.0, y: hop.1 })?;
            self.add_or_merge_route4(hop.0, hop.1, direction, direction.opposite(), prev_src)?;
            prev_src = Source::Cell {
                x: hop.0,
                y: hop.1,
                out: direction.index(),
            };
            last_dir = direction;
            cur = hop;
        }
        Ok((last_dir, cur))
    }

    fn perpendicular_candidates(&self, side: Direction) -> [Direction; 2] {
        match side {
            Direction::N | Direction::S => [Direction::E, Direction::W],
            Direction::E | Direction::W => [Direction::N, Direction::S],
        }
    }

    fn build_detours(
        &self,
        side: Direction,
        from: (u16, u16),
        extra_hops: u32,
        avoid: (u16, u16),
    ) -> Vec<(u16, u16)> {
        let candidates = self.perpendicular_candidates(side);
        let mut detours = Vec::new();
        let mut cur = from;
        for _ in 0..extra_hops {
            let mut placed = false;
            for dir in candidates {
                let (dx, dy) = dir.step();
                let nx = cur.0 as i32 + dx;
                let ny = cur.1 as i32 + dy;
                if self.in_bounds(nx, ny) {
                    let next = (nx as u16, ny as u16);
                    if self.is_free(next.0, next.1) && next != avoid {
                        detours.push(next);
                        cur = next;
                        placed = true;
                        break;
                    }
                }
            }
            if !placed {
                break;
            }
        }
        detours
    }

    /// Routes a signal entering the grid at the physical `(side, pos)`
    /// edge to a neighbor of `dst`. `extra_hops` inserts perpendicular
    /// detours first, lengthening the path for parity alignment. Returns
    /// the direction facing `dst`, the coordinate of the last hop, and the
    /// number of inter-cell hops taken.
    pub fn wire_from_edge_to(
        &mut self,
        side: Direction,
        pos: u16,
        edge_source: Source,
        dst: (u16, u16),
        extra_hops: u32,
    ) -> Result<(Direction, (u16, u16), u32), RouteError> {
        let primary = side.opposite();
        let mut start = self.edge_cell(side, pos);
        if !self.is_free(start.0, start.1) {
            let (dx, dy) = primary.step();
            let alt = (
                (start.0 as i32 + dx) as u16,
                (start.1 as i32 + dy) as u16,
            );
            if self.in_bounds(alt.0 as i32, alt.1 as i32) && self.is_free(alt.0, alt.1) {
                start = alt;
            }
        }

        let mut avoid_moves = HashSet::new();
        match side {
            Direction::W => {
                for y in 0..self.height {
                    avoid_moves.insert((1, y, Direction::W));
                }
            }
            Direction::E => {
                for y in 0..self.height {
                    avoid_moves.insert((self.width - 2, y, Direction::E));
                }
            }
            Direction::N => {
                for x in 0..self.width {
                    avoid_moves.insert((x, 1, Direction::N));
                }
            }
            Direction::S => {
                for x in 0..self.width {
                    avoid_moves.insert((x, self.height - 2, Direction::S));
                }
            }
        }
        for (&(rx, ry), cell) in &self.route_cells {
            let luts = cell.effective_luts();
            for dir in Direction::ALL {
                if luts[dir.index() as usize] != 0 {
                    avoid_moves.insert((rx, ry, dir));
                }
            }
        }

        let reused = self
            .route_cells
            .get(&start)
            .map(|cell| {
                cell.input(side) == Some(&edge_source) && cell.effective_luts()[primary.index() as usize] != 0
            })
            .unwrap_or(false);

        let chosen_dir = if reused {
            primary
        } else {
            match self.add_or_merge_route4(start.0, start.1, primary, side, edge_source.clone()) {
                Ok(()) => primary,
                Err(RouteError::OutputConflict { .. }) => {
                    let mut picked = None;
                    for dir in Direction::ALL {
                        if dir == primary {
                            continue;
                        }
                        if self
                            .add_or_merge_route4(start.0, start.1, dir, side, edge_source.clone())
                            .is_ok()
                        {
                            picked = Some(dir);
                            break;
                        }
                    }
                    picked.ok_or(RouteError::OutputConflict {
                        x: start.0,
                        y: start.1,
                        dir: primary,
                    })?
                }
                Err(other) => return Err(other),
            }
        };
        let mut prev_src = Source::Cell {
            x: start.0,
            y: start.1,
            out: chosen_dir.index(),
        };

        let (dx, dy) = chosen_dir.step();
        let first_candidate = (start.0 as i32 + dx, start.1 as i32 + dy);
        let first_step = if self.in_bounds(first_candidate.0, first_candidate.1) {
            let p = (first_candidate.0 as u16, first_candidate.1 as u16);
            if p != dst { Some(p) } else { None }
        } else {
            None
        };

        let detour_base = first_step.unwrap_or(start);
        let mut detours = self.build_detours(side, detour_base, extra_hops, dst);

        let k = *self.edge_fanout_index.get(&(side, pos)).unwrap_or(&0);
        if k > 0 {
            let (dx, dy) = chosen_dir.step();
            let mut cur = *detours.last().unwrap_or(&detour_base);
            for _ in 0..k {
                let next = (cur.0 as i32 + dx, cur.1 as i32 + dy);
                if self.in_bounds(next.0, next.1) {
                    let next = (next.0 as u16, next.1 as u16);
                    if next != dst {
                        detours.push(next);
                        cur = next;
                        continue;
                    }
                }
                break;
            }
        }

        let start_for_core = *detours.last().unwrap_or(&detour_base);
        let core = self
            .route(start_for_core, dst, 0.0, Some(&avoid_moves))
            .or_else(|_| self.route(start_for_core, dst, 0.0, None))?;

        let mut hops: Vec<(u16, u16)> = Vec::new();
        if let Some(step) = first_step {
            hops.push(step);
        }
        hops.extend(detours);
        if !core.is_empty() {
            hops.extend(&core[..core.len() - 1]);
        }

        let mut cur = start;
        let mut last_dir = chosen_dir;
        for (i, &hop) in hops.iter().enumerate() {
            let in_dir = Direction::between(cur.0 as i32, cur.1 as i32, hop.0 as i32, hop.1 as i32)
                .ok_or(RouteError::NonAdjacentHop { x: hop.0, y: hop.1 })?;
            let out_dir = if i + 1 < hops.len() {
                Direction::between(hop.0 as i32, hop.1 as i32, hops[i + 1].0 as i32, hops[i + 1].1 as i32)
                    .ok_or(RouteError::NonAdjacentHop { x: hop.0, y: hop.1 })?
            } else {
                Direction::between(hop.0 as i32, hop.1 as i32, dst.0 as i32, dst.1 as i32)
                    .unwrap_or(last_dir)
            };
            self.add_or_merge_route4(hop.0, hop.1, out_dir, in_dir.opposite(), prev_src)?;
            prev_src = Source::Cell {
                x: hop.0,
                y: hop.1,
                out: out_dir.index(),
            };
            last_dir = out_dir;
            cur = hop;
        }

        self.edge_fanout_index.insert((side, pos), k + 1);
        Ok((last_dir, cur, hops.len() as u32))
    }

    /// Routes from `src` to the physical `(side, pos)` edge, exposing the
    /// final hop's output on that boundary side. Returns the number of
    /// inter-cell hops taken.
    pub fn wire_to_edge_from(
        &mut self,
        src: (u16, u16),
        src_out: u8,
        side: Direction,
        pos: u16,
        extra_hops: u32,
    ) -> Result<u32, RouteError> {
        let target = self.edge_cell(side, pos);
        let pre_hops = self.build_detours(side, src, extra_hops, target);
        let start_for_route = *pre_hops.last().unwrap_or(&src);
        let core = self.route(start_for_route, target, 0.0, None)?;

        let mut path = pre_hops;
        path.extend(core);

        let mut cur = src;
        let mut prev_src = Source::Cell {
            x: src.0,
            y: src.1,
            out: src_out,
        };
        let last = path.len().saturating_sub(1);
        for (i, &hop) in path.iter().enumerate() {
            let direction = Direction::between(cur.0 as i32, cur.1 as i32, hop.0 as i32, hop.1 as i32)
                .ok_or(RouteError::NonAdjacentHop { x: hop.0, y: hop.1 })?;
            let out_dir = if i == last { side } else { direction };
            self.add_or_merge_route4(hop.0, hop.1, out_dir, direction.opposite(), prev_src)?;
            prev_src = Source::Cell {
                x: hop.0,
                y: hop.1,
                out: out_dir.index(),
            };
            cur = hop;
        }
        Ok(path.len() as u32)
    }

    /// Routes directly from one physical edge to another. Returns the
    /// number of inter-cell hops taken.
    pub fn wire_edge_to_edge(
        &mut self,
        side_src: Direction,
        pos_src: u16,
        edge_source: Source,
        side_dst: Direction,
        pos_dst: u16,
        extra_hops: u32,
    ) -> Result<u32, RouteError> {
        let start = self.edge_cell(side_src, pos_src);
        let out_dir_first = side_src.opposite();
        let target = self.edge_cell(side_dst, pos_dst);

        let pre_hops = self.build_detours(side_src, start, extra_hops, target);
        let start_for_route = *pre_hops.last().unwrap_or(&start);
        let core = self.route(start_for_route, target, 0.0, None)?;

        let mut path = pre_hops;
        path.extend(core);

        self.add_or_merge_route4(start.0, start.1, out_dir_first, side_src, edge_source)?;
        let mut prev_src = Source::Cell {
            x: start.0,
            y: start.1,
            out: out_dir_first.index(),
        };
        let mut cur = start;
        let last = path.len().saturating_sub(1);
        for (i, &hop) in path.iter().enumerate() {
            let direction = Direction::between(cur.0 as i32, cur.1 as i32, hop.0 as i32, hop.1 as i32)
                .ok_or(RouteError::NonAdjacentHop { x: hop.0, y: hop.1 })?;
            let out_dir = if i == last { side_dst } else { direction };
            self.add_or_merge_route4(hop.0, hop.1, out_dir, direction.opposite(), prev_src)?;
            prev_src = Source::Cell {
                x: hop.0,
                y: hop.1,
                out: out_dir.index(),
            };
            cur = hop;
        }
        Ok(path.len() as u32)
    }
}
