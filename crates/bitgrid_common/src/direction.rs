//! Cardinal direction encoding shared by every grid-facing component.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four cardinal directions a cell edge can face.
///
/// The numeric encoding (`N=0, E=1, S=2, W=3`) is load-bearing: it is used
/// directly to build the 4-bit LUT index `idx = N | (E<<1) | (S<<2) | (W<<3)`
/// and as the `out` discriminant on `Cell` sources.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// North, index 0.
    N = 0,
    /// East, index 1.
    E = 1,
    /// South, index 2.
    S = 2,
    /// West, index 3.
    W = 3,
}

impl Direction {
    /// All four directions in index order.
    pub const ALL: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

    /// Builds a direction from its numeric index (0..=3).
    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(Direction::N),
            1 => Some(Direction::E),
            2 => Some(Direction::S),
            3 => Some(Direction::W),
            _ => None,
        }
    }

    /// The numeric index of this direction.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The direction a neighbor reached by moving in `self` looks back
    /// through to see this cell, e.g. moving `N` means the neighbor sees us
    /// on its `S` side.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::E => Direction::W,
            Direction::S => Direction::N,
            Direction::W => Direction::E,
        }
    }

    /// The `(dx, dy)` unit step taken when moving one cell in this direction,
    /// using a row-major coordinate system where y increases downward (north
    /// decreases y, south increases y, matching the grid's row-major scan
    /// order).
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::E => (1, 0),
            Direction::S => (0, 1),
            Direction::W => (-1, 0),
        }
    }

    /// The direction from `(x1, y1)` to an orthogonally adjacent
    /// `(x2, y2)`, or `None` if the two points are not Manhattan-adjacent
    /// (distance 1 along exactly one axis).
    pub fn between(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Direction> {
        match (x2 - x1, y2 - y1) {
            (0, -1) => Some(Direction::N),
            (1, 0) => Some(Direction::E),
            (0, 1) => Some(Direction::S),
            (-1, 0) => Some(Direction::W),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::N => 'N',
            Direction::E => 'E',
            Direction::S => 'S',
            Direction::W => 'W',
        };
        write!(f, "{c}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_spec_encoding() {
        assert_eq!(Direction::N.index(), 0);
        assert_eq!(Direction::E.index(), 1);
        assert_eq!(Direction::S.index(), 2);
        assert_eq!(Direction::W.index(), 3);
    }

    #[test]
    fn from_index_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_index(d.index()), Some(d));
        }
        assert_eq!(Direction::from_index(4), None);
    }

    #[test]
    fn opposite_pairs() {
        assert_eq!(Direction::N.opposite(), Direction::S);
        assert_eq!(Direction::S.opposite(), Direction::N);
        assert_eq!(Direction::E.opposite(), Direction::W);
        assert_eq!(Direction::W.opposite(), Direction::E);
    }

    #[test]
    fn between_adjacent() {
        assert_eq!(Direction::between(5, 5, 5, 4), Some(Direction::N));
        assert_eq!(Direction::between(5, 5, 6, 5), Some(Direction::E));
        assert_eq!(Direction::between(5, 5, 5, 6), Some(Direction::S));
        assert_eq!(Direction::between(5, 5, 4, 5), Some(Direction::W));
    }

    #[test]
    fn between_non_adjacent_is_none() {
        assert_eq!(Direction::between(0, 0, 2, 0), None);
        assert_eq!(Direction::between(0, 0, 1, 1), None);
        assert_eq!(Direction::between(0, 0, 0, 0), None);
    }

    #[test]
    fn display() {
        assert_eq!(Direction::N.to_string(), "N");
        assert_eq!(Direction::W.to_string(), "W");
    }
}
