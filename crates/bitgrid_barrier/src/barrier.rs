//! A per-tile two-phase barrier over the four neighbor directions.

use bitgrid_common::Direction;
use std::collections::HashMap;

/// One half of a two-phase epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// First subphase of an epoch.
    A,
    /// Second subphase of an epoch.
    B,
}

/// A barrier's current position: an epoch counter plus which subphase of
/// it is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrierState {
    /// The epoch number, incremented on every B -> A transition.
    pub epoch: u32,
    /// The current subphase.
    pub phase: Phase,
}

/// The result of [`NeighborBarrier::mark_neighbor_done`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The mark was recorded.
    Ok,
    /// `direction` is not one this barrier expects an acknowledgement from.
    UnexpectedSide,
    /// The mark's epoch does not match the barrier's current epoch.
    EpochMismatch,
    /// The mark's phase does not match the barrier's current phase.
    PhaseMismatch,
    /// This exact `(epoch, phase, direction)` was already marked.
    Duplicate,
}

/// Tracks a tile's progress through a two-phase `(epoch, phase)` cycle,
/// advancing only once its own work and every expected neighbor's
/// acknowledgement for the current subphase have landed.
pub struct NeighborBarrier {
    state: BarrierState,
    expect: [bool; 4],
    local_done: HashMap<(u32, Phase), bool>,
    neighbor_done: HashMap<(u32, Phase, Direction), bool>,
}

impl NeighborBarrier {
    /// Builds a barrier starting at `(epoch=0, phase=A)`, expecting
    /// acknowledgement only from the neighbor directions flagged `true`.
    pub fn new(expect_north: bool, expect_east: bool, expect_south: bool, expect_west: bool) -> Self {
        let mut expect = [false; 4];
        expect[Direction::N.index() as usize] = expect_north;
        expect[Direction::E.index() as usize] = expect_east;
        expect[Direction::S.index() as usize] = expect_south;
        expect[Direction::W.index() as usize] = expect_west;
        Self {
            state: BarrierState {
                epoch: 0,
                phase: Phase::A,
            },
            expect,
            local_done: HashMap::new(),
            neighbor_done: HashMap::new(),
        }
    }

    /// The current `(epoch, phase)`.
    pub fn current(&self) -> (u32, Phase) {
        (self.state.epoch, self.state.phase)
    }

    /// Whether this barrier expects an acknowledgement from `direction`.
    pub fn expects(&self, direction: Direction) -> bool {
        self.expect[direction.index() as usize]
    }

    /// Marks the current `(epoch, phase)` as locally complete.
    pub fn local_done(&mut self) {
        self.local_done.insert((self.state.epoch, self.state.phase), true);
    }

    /// Records a neighbor acknowledgement for `(direction, epoch, phase)`
    /// and reports what happened to it. Marks for an unexpected direction,
    /// a stale or future epoch/phase, or a repeat of an already-recorded
    /// mark are reported rather than silently ignored.
    pub fn mark_neighbor_done(&mut self, direction: Direction, epoch: u32, phase: Phase) -> MarkOutcome {
        if !self.expects(direction) {
            return MarkOutcome::UnexpectedSide;
        }
        if epoch != self.state.epoch {
            return MarkOutcome::EpochMismatch;
        }
        if phase != self.state.phase {
            return MarkOutcome::PhaseMismatch;
        }
        let key = (epoch, phase, direction);
        if self.neighbor_done.get(&key).copied().unwrap_or(false) {
            return MarkOutcome::Duplicate;
        }
        self.neighbor_done.insert(key, true);
        MarkOutcome::Ok
    }

    /// True exactly when the local flag and every expected neighbor flag
    /// for the current `(epoch, phase)` are set.
    pub fn can_advance(&self) -> bool {
        let key = (self.state.epoch, self.state.phase);
        if !self.local_done.get(&key).copied().unwrap_or(false) {
            return false;
        }
        Direction::ALL.iter().all(|dir| {
            !self.expects(*dir)
                || self
                    .neighbor_done
                    .get(&(self.state.epoch, self.state.phase, *dir))
                    .copied()
                    .unwrap_or(false)
        })
    }

    /// Moves `A -> B` within the current epoch, or `B -> A` with the
    /// epoch incremented. A no-op unless [`Self::can_advance`].
    pub fn advance(&mut self) {
        if !self.can_advance() {
            return;
        }
        match self.state.phase {
            Phase::A => self.state.phase = Phase::B,
            Phase::B => {
                self.state.phase = Phase::A;
                self.state.epoch += 1;
            }
        }
    }
}
