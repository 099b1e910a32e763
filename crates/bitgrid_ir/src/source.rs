//! A cell input's upstream source.

use serde::{Deserialize, Serialize};

/// The upstream source feeding a cell input pin, or an output bit.
///
/// Mirrors the Program JSON contract exactly: `{"type":"const","value":0|1}`,
/// `{"type":"input","name":str,"bit":int}`, `{"type":"cell","x":int,"y":int,"out":0..3}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    /// A constant bit, 0 or 1.
    Const {
        /// The constant value, 0 or 1. Any other value is treated as
        /// truthy (non-zero) by evaluators, but well-formed Programs only
        /// ever use 0 or 1.
        value: u8,
    },
    /// One bit of a named input bus.
    Input {
        /// The bus name.
        name: String,
        /// The bit index within the bus.
        bit: u8,
    },
    /// One output direction of another cell.
    Cell {
        /// The source cell's x coordinate.
        x: u16,
        /// The source cell's y coordinate.
        y: u16,
        /// Which of the source cell's four outputs to read (0..=3).
        out: u8,
    },
}

impl Source {
    /// A `Const { value: 0 }` source, used as the default for unfilled pins.
    pub fn const_zero() -> Self {
        Source::Const { value: 0 }
    }

    /// Returns `true` for `Source::Const`.
    pub fn is_const(&self) -> bool {
        matches!(self, Source::Const { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_const() {
        let s = Source::Const { value: 1 };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json, serde_json::json!({"type": "const", "value": 1}));
    }

    #[test]
    fn json_shape_input() {
        let s = Source::Input {
            name: "west".to_string(),
            bit: 3,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "input", "name": "west", "bit": 3})
        );
    }

    #[test]
    fn json_shape_cell() {
        let s = Source::Cell { x: 1, y: 2, out: 0 };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "cell", "x": 1, "y": 2, "out": 0})
        );
    }

    #[test]
    fn const_zero_is_const() {
        assert!(Source::const_zero().is_const());
        assert!(!Source::Input {
            name: "a".into(),
            bit: 0
        }
        .is_const());
    }
}
