//! The logical emulator: evaluates a `Program` directly against its
//! symbolic `Source` graph rather than a dense positional grid. Used for
//! integration tests that want to drive named input/output buses without
//! first physicalizing a program to the edges.

use bitgrid_bitstream::{apply_bitstream_to_program, BitstreamError};
use bitgrid_ir::{Cell, Program, Source};
use std::collections::HashMap;

/// Evaluates a `Program` against its `Source` graph, two phases at a time.
///
/// Stateless across [`Emulator::run_vector`]/[`Emulator::run`] calls (cell
/// outputs reset to zero before each vector), but stateful across
/// [`Emulator::run_stream`] calls unless `reset` is requested, carrying a
/// persistent cycle counter.
pub struct Emulator {
    program: Program,
    cell_out: HashMap<(u16, u16), [u8; 4]>,
    cycle: u64,
}

impl Emulator {
    /// Builds an emulator over `program`, with every cell's output state
    /// at zero.
    pub fn new(program: Program) -> Self {
        let cell_out = program.cells.iter().map(|c| ((c.x, c.y), [0u8; 4])).collect();
        Self {
            program,
            cell_out,
            cycle: 0,
        }
    }

    /// The program currently loaded.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The persistent streaming cycle counter (advanced only by
    /// [`Emulator::run_stream`]).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Applies a bitstream (headered or raw) onto the loaded program's
    /// LUTs, materializing placeholder cells as needed, and resets all
    /// cell output state and the cycle counter.
    pub fn load_bitstream(&mut self, data: &[u8]) -> Result<(), BitstreamError> {
        apply_bitstream_to_program(&mut self.program, data)?;
        self.reset_cell_outputs();
        Ok(())
    }

    fn reset_cell_outputs(&mut self) {
        self.cell_out = self.program.cells.iter().map(|c| ((c.x, c.y), [0u8; 4])).collect();
        self.cycle = 0;
    }

    fn src_value(&self, src: &Source, inputs: &HashMap<String, u64>) -> u8 {
        match src {
            Source::Const { value } => value & 1,
            Source::Input { name, bit } => {
                let val = inputs.get(name).copied().unwrap_or(0);
                ((val >> *bit as u32) & 1) as u8
            }
            Source::Cell { x, y, out } => self
                .cell_out
                .get(&(*x, *y))
                .map(|outs| outs[*out as usize])
                .unwrap_or(0)
                & 1,
        }
    }

    fn eval_cell(&self, cell: &Cell, inputs: &HashMap<String, u64>) -> [u8; 4] {
        let mut idx: u16 = 0;
        for (i, input) in cell.inputs.iter().enumerate() {
            let bit = match input {
                Some(src) => self.src_value(src, inputs),
                None => 0,
            };
            idx |= (bit as u16) << i;
        }
        let luts = cell.effective_luts();
        [
            ((luts[0] >> idx) & 1) as u8,
            ((luts[1] >> idx) & 1) as u8,
            ((luts[2] >> idx) & 1) as u8,
            ((luts[3] >> idx) & 1) as u8,
        ]
    }

    /// Evaluates every cell of the active parity against the inputs,
    /// reading strictly from the state as it stood before this call, then
    /// commits all of them together — matching "commit all active-parity
    /// updates atomically after all reads".
    fn commit_phase(&mut self, active_even: bool, inputs: &HashMap<String, u64>) {
        let mut updates = Vec::new();
        for cell in &self.program.cells {
            let is_even = (cell.x as u32 + cell.y as u32) % 2 == 0;
            if is_even != active_even {
                continue;
            }
            updates.push(((cell.x, cell.y), self.eval_cell(cell, inputs)));
        }
        for (key, outs) in updates {
            self.cell_out.insert(key, outs);
        }
    }

    /// Resets cell outputs to zero, advances `latency` subcycles against
    /// `inputs` (phase A on even cycles, phase B on odd), and samples
    /// output buses. Independent of the streaming cycle counter.
    pub fn run_vector(&mut self, inputs: &HashMap<String, u64>) -> HashMap<String, u64> {
        for outs in self.cell_out.values_mut() {
            *outs = [0u8; 4];
        }
        for cyc in 0..self.program.latency {
            self.commit_phase(cyc % 2 == 0, inputs);
        }
        self.sample_outputs(inputs)
    }

    /// Runs each vector independently, resetting cell outputs between
    /// vectors.
    pub fn run(&mut self, vectors: &[HashMap<String, u64>]) -> Vec<HashMap<String, u64>> {
        vectors.iter().map(|v| self.run_vector(v)).collect()
    }

    /// Drives a sequence of steps, advancing `cycles_per_step` subcycles
    /// per step against the persistent cycle counter, sampling outputs
    /// after each step. If `reset`, cell outputs and the cycle counter
    /// are cleared before the first step.
    pub fn run_stream(
        &mut self,
        steps: &[HashMap<String, u64>],
        cycles_per_step: u32,
        reset: bool,
    ) -> Vec<HashMap<String, u64>> {
        if reset {
            self.reset_cell_outputs();
        }
        let mut results = Vec::with_capacity(steps.len());
        for step_inputs in steps {
            for _ in 0..cycles_per_step {
                let active_even = self.cycle % 2 == 0;
                self.commit_phase(active_even, step_inputs);
                self.cycle += 1;
            }
            results.push(self.sample_outputs(step_inputs));
        }
        results
    }

    /// Dereferences each declared output bus's bit sources against the
    /// current cell outputs and `inputs`, without advancing any cycle.
    pub fn sample_outputs(&self, inputs: &HashMap<String, u64>) -> HashMap<String, u64> {
        self.program
            .output_bits
            .iter()
            .map(|(name, bits)| {
                let mut val = 0u64;
                for (i, src) in bits.iter().enumerate() {
                    val |= (self.src_value(src, inputs) as u64) << i;
                }
                (name.clone(), val)
            })
            .collect()
    }
}
