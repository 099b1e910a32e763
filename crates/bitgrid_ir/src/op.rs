//! The `op` tag carried by every `Cell`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An informational operator tag.
///
/// Runtime evaluation never dispatches on `op` — it is entirely LUT-driven
/// through `CellParams::effective_luts`. The set of legal tags beyond `LUT`
/// and `ROUTE4` is open: unrecognized tags are preserved verbatim through
/// JSON round-trips rather than rejected, matching `LUT`/`ROUTE4`'s treatment
/// as the only two tags this toolchain assigns meaning to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Op(pub String);

impl Op {
    /// The tag used for a plain LUT cell.
    pub fn lut() -> Self {
        Op("LUT".to_string())
    }

    /// The tag used for a router-synthesized pass-through cell.
    pub fn route4() -> Self {
        Op("ROUTE4".to_string())
    }

    /// Whether this tag is exactly `"ROUTE4"`.
    pub fn is_route4(&self) -> bool {
        self.0 == "ROUTE4"
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Op {
    fn from(s: &str) -> Self {
        Op(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route4_tag() {
        assert!(Op::route4().is_route4());
        assert!(!Op::lut().is_route4());
    }

    #[test]
    fn unknown_tag_preserved() {
        let op = Op::from("ADD_BIT");
        assert_eq!(op.to_string(), "ADD_BIT");
        assert!(!op.is_route4());
    }
}
