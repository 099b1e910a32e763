//! Configuration for a physicalization pass.

use bitgrid_common::Direction;
use std::collections::HashMap;

/// Controls which physical edges logical inputs and outputs land on, and
/// whether extra detour hops are inserted to align hop-count parity.
#[derive(Clone, Debug)]
pub struct PhysicalizeConfig {
    /// Default edge every input bus is driven from.
    pub input_side: Direction,
    /// Default edge every output bus is sampled at.
    pub output_side: Direction,
    /// Per-bus override of `input_side`, keyed by bus name.
    pub input_side_map: HashMap<String, Direction>,
    /// Per-bus override of `output_side`, keyed by bus name.
    pub output_side_map: HashMap<String, Direction>,
    /// Per-bus extra detour hop count for output routing, keyed by bus
    /// name.
    pub output_extra_hops: HashMap<String, u32>,
    /// Insert one extra detour hop on input routes when the edge-to-sink
    /// hop count would otherwise land on the wrong parity.
    pub align_parity: bool,
}

impl Default for PhysicalizeConfig {
    fn default() -> Self {
        Self {
            input_side: Direction::W,
            output_side: Direction::E,
            input_side_map: HashMap::new(),
            output_side_map: HashMap::new(),
            output_extra_hops: HashMap::new(),
            align_parity: true,
        }
    }
}
