//! Dependency analysis over a `Program`'s cell graph: a cell depends on
//! every other cell referenced by one of its `Cell`-typed input sources.
//! This is a read-only analysis independent of routing or physicalization.

use crate::error::DagError;
use bitgrid_ir::{Program, Source};
use std::collections::{BTreeSet, HashMap};

fn cell_dependencies(program: &Program) -> HashMap<(u16, u16), Vec<(u16, u16)>> {
    program
        .cells
        .iter()
        .map(|cell| {
            let deps = cell
                .inputs
                .iter()
                .flatten()
                .filter_map(|src| match src {
                    Source::Cell { x, y, .. } => Some((*x, *y)),
                    _ => None,
                })
                .collect();
            ((cell.x, cell.y), deps)
        })
        .collect()
}

/// A deterministic topological ordering of cell coordinates: ties among
/// simultaneously-ready cells are broken by `(y, x)`. Fails if the input
/// pins describe a cycle.
pub fn topo_order(program: &Program) -> Result<Vec<(u16, u16)>, DagError> {
    let deps = cell_dependencies(program);
    let mut dependents: HashMap<(u16, u16), Vec<(u16, u16)>> = HashMap::new();
    let mut remaining: HashMap<(u16, u16), usize> =
        deps.keys().map(|&coord| (coord, 0)).collect();

    for (&coord, coord_deps) in &deps {
        for &dep in coord_deps {
            dependents.entry(dep).or_default().push(coord);
            *remaining.get_mut(&coord).expect("coord present") += 1;
        }
    }

    // Ordered by (y, x) so pop-first gives the spec's tie-break rule.
    let mut ready: BTreeSet<(u16, u16)> = BTreeSet::new();
    for (&(x, y), &count) in &remaining {
        if count == 0 {
            ready.insert((y, x));
        }
    }

    let mut order = Vec::with_capacity(deps.len());
    while let Some(&(y, x)) = ready.iter().next() {
        ready.remove(&(y, x));
        order.push((x, y));
        if let Some(next) = dependents.get(&(x, y)) {
            for &successor in next {
                let count = remaining.get_mut(&successor).expect("successor present");
                *count -= 1;
                if *count == 0 {
                    ready.insert((successor.1, successor.0));
                }
            }
        }
    }

    if order.len() != deps.len() {
        return Err(DagError::Cycle);
    }
    Ok(order)
}

/// Assigns each cell a level: one plus the maximum level of its
/// `Cell`-typed dependencies, or 0 if it has none.
pub fn levels(program: &Program) -> Result<HashMap<(u16, u16), u32>, DagError> {
    let order = topo_order(program)?;
    let deps = cell_dependencies(program);
    let mut level_map: HashMap<(u16, u16), u32> = HashMap::with_capacity(order.len());
    for coord in order {
        let level = deps[&coord]
            .iter()
            .map(|dep| level_map[dep] + 1)
            .max()
            .unwrap_or(0);
        level_map.insert(coord, level);
    }
    Ok(level_map)
}

/// The maximum level across all cells, plus one; a sizing estimate only,
/// never used for scheduling.
pub fn critical_path_length(program: &Program) -> Result<u32, DagError> {
    let level_map = levels(program)?;
    Ok(level_map.values().copied().max().map_or(0, |m| m + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitgrid_ir::{Cell, Direction};

    fn chain_program() -> Program {
        let mut p = Program::new(4, 2, 0);
        p.upsert_cell(Cell::new_lut(0, 0, [0xFFFF, 0, 0, 0]));
        let mut mid = Cell::new_lut(1, 0, [0xFFFF, 0, 0, 0]);
        mid.set_input(Direction::W, Source::Cell { x: 0, y: 0, out: 0 });
        p.upsert_cell(mid);
        let mut last = Cell::new_lut(2, 0, [0xFFFF, 0, 0, 0]);
        last.set_input(Direction::W, Source::Cell { x: 1, y: 0, out: 0 });
        p.upsert_cell(last);
        p
    }

    #[test]
    fn topo_order_respects_dependency_chain() {
        let p = chain_program();
        let order = topo_order(&p).unwrap();
        let pos = |c: (u16, u16)| order.iter().position(|&x| x == c).unwrap();
        assert!(pos((0, 0)) < pos((1, 0)));
        assert!(pos((1, 0)) < pos((2, 0)));
    }

    #[test]
    fn independent_cells_break_ties_by_y_then_x() {
        let mut p = Program::new(4, 4, 0);
        p.upsert_cell(Cell::new_lut(2, 0, [0, 0, 0, 0]));
        p.upsert_cell(Cell::new_lut(0, 1, [0, 0, 0, 0]));
        p.upsert_cell(Cell::new_lut(1, 0, [0, 0, 0, 0]));
        let order = topo_order(&p).unwrap();
        assert_eq!(order, vec![(1, 0), (2, 0), (0, 1)]);
    }

    #[test]
    fn cycle_is_detected() {
        let mut p = Program::new(4, 2, 0);
        let mut a = Cell::new_lut(0, 0, [0xFFFF, 0, 0, 0]);
        a.set_input(Direction::W, Source::Cell { x: 1, y: 0, out: 0 });
        let mut b = Cell::new_lut(1, 0, [0xFFFF, 0, 0, 0]);
        b.set_input(Direction::W, Source::Cell { x: 0, y: 0, out: 0 });
        p.upsert_cell(a);
        p.upsert_cell(b);
        assert_eq!(topo_order(&p), Err(DagError::Cycle));
    }

    #[test]
    fn levels_increase_along_the_chain() {
        let p = chain_program();
        let level_map = levels(&p).unwrap();
        assert_eq!(level_map[&(0, 0)], 0);
        assert_eq!(level_map[&(1, 0)], 1);
        assert_eq!(level_map[&(2, 0)], 2);
    }

    #[test]
    fn critical_path_length_is_deepest_level_plus_one() {
        let p = chain_program();
        assert_eq!(critical_path_length(&p).unwrap(), 3);
    }

    #[test]
    fn empty_program_has_zero_critical_path_length() {
        let p = Program::new(2, 2, 0);
        assert_eq!(critical_path_length(&p).unwrap(), 0);
    }
}
