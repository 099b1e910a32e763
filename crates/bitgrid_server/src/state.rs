//! The mutex-guarded state one server process shares across every
//! connection: a single emulator, its current input latch, in-flight
//! chunk-upload sessions, and outbound seam links.

use crate::chunk_session::ChunkSession;
use crate::link::{LinkForward, LinkState};
use bitgrid_emulator::Emulator;
use bitgrid_ir::Program;
use std::collections::HashMap;
use std::sync::Mutex;

/// Everything a connection handler needs to touch, held behind one lock.
///
/// A single mutex (rather than one per field) mirrors the reference
/// server's single global lock: STEP, SET_INPUTS, LOAD_CHUNK, and LINK
/// all touch the emulator or its input latch together, so a finer split
/// would just move the contention around.
pub struct ServerState {
    /// The emulator driving the loaded program.
    pub emulator: Emulator,
    /// Current value of every declared input bus, merged in by
    /// `SET_INPUTS` and consumed on the next `STEP`.
    pub current_inputs: HashMap<String, u64>,
    /// In-flight `LOAD_CHUNK` uploads, keyed by session id.
    pub sessions: HashMap<u16, ChunkSession>,
    /// Established outbound seam links, keyed by [`LinkState::key`].
    pub links: HashMap<String, LinkState>,
}

impl ServerState {
    /// Builds state over `program`, latching every declared input bus to
    /// zero.
    pub fn new(program: Program) -> Self {
        let current_inputs = program.input_bits.keys().map(|k| (k.clone(), 0u64)).collect();
        Self {
            emulator: Emulator::new(program),
            current_inputs,
            sessions: HashMap::new(),
            links: HashMap::new(),
        }
    }

    /// The program currently loaded.
    pub fn program(&self) -> &Program {
        self.emulator.program()
    }
}

/// Process-wide server handle: the locked state plus the immutable
/// configuration every connection handler needs.
pub struct Shared {
    /// The shared, lockable emulator state.
    pub state: Mutex<ServerState>,
    /// How outbound seam links forward subcycle outputs to their peers.
    pub link_forward: LinkForward,
    /// Whether to log connection lifecycle and dispatch events to stderr.
    pub verbose: bool,
}
