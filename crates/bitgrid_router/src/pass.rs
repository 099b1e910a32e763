//! The top-level routing pass: rewires non-adjacent cell-to-cell inputs
//! through inserted `ROUTE4` hops.

use crate::error::RouteError;
use crate::router::ManhattanRouter;
use bitgrid_ir::{manhattan_distance, Program, Source};

/// Inserts `ROUTE4` cells so that every cell input referencing another
/// cell at Manhattan distance > 1 instead reads from an orthogonal
/// neighbor. Inputs already adjacent (or not cell-sourced) are left
/// untouched. Returns a new program with the original cells plus the
/// inserted routing cells.
pub fn route_program(program: &Program) -> Result<Program, RouteError> {
    let mut router = ManhattanRouter::with_occupied_from_program(program);
    let mut rewired = program.clone();

    for sink_idx in 0..rewired.cells.len() {
        let (sx, sy) = (rewired.cells[sink_idx].x, rewired.cells[sink_idx].y);
        for pin in 0..4 {
            let Some(Source::Cell { x: tx, y: ty, out }) = rewired.cells[sink_idx].inputs[pin].clone()
            else {
                continue;
            };
            if manhattan_distance(tx, ty, sx, sy) <= 1 {
                continue;
            }
            let (last_dir, last_xy) = router.wire_adjacent_to((tx, ty), out, (sx, sy))?;
            rewired.cells[sink_idx].inputs[pin] = Some(Source::Cell {
                x: last_xy.0,
                y: last_xy.1,
                out: last_dir.index(),
            });
        }
    }

    rewired.cells.extend(router.new_cells());
    Ok(rewired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitgrid_ir::{Cell, Source};

    #[test]
    fn adjacent_inputs_are_left_untouched() {
        let mut p = Program::new(4, 2, 0);
        let mut sink = Cell::new_lut(1, 0, [0xAAAA, 0, 0, 0]);
        sink.set_input(
            bitgrid_common::Direction::W,
            Source::Cell { x: 0, y: 0, out: 0 },
        );
        p.upsert_cell(Cell::new_lut(0, 0, [0, 0, 0, 0]));
        p.upsert_cell(sink);

        let routed = route_program(&p).unwrap();
        assert_eq!(routed.cells.len(), 2);
    }

    #[test]
    fn distant_input_gets_routed_and_rewired() {
        let mut p = Program::new(6, 2, 0);
        let mut sink = Cell::new_lut(4, 0, [0xAAAA, 0, 0, 0]);
        sink.set_input(
            bitgrid_common::Direction::W,
            Source::Cell { x: 0, y: 0, out: 0 },
        );
        p.upsert_cell(Cell::new_lut(0, 0, [0, 0, 0, 0]));
        p.upsert_cell(sink);

        let routed = route_program(&p).unwrap();
        assert!(routed.cells.len() > 2);
        let rewired_sink = routed.cell_at(4, 0).unwrap();
        let input = rewired_sink.input(bitgrid_common::Direction::W).unwrap();
        match input {
            Source::Cell { x, y, .. } => {
                assert_eq!(manhattan_distance(*x, *y, 4, 0), 1);
            }
            _ => panic!("expected a cell source"),
        }
    }
}
