//! Diagnostic category/number codes, e.g. `P101`, `S201`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The broad area a diagnostic belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Program/LUTGrid configuration problems.
    Config,
    /// Routing and physicalization problems.
    Routing,
    /// Bitstream codec problems.
    Bitstream,
    /// Wire protocol / session problems.
    Protocol,
}

impl Category {
    /// The single-character prefix used when formatting a [`DiagnosticCode`].
    pub fn prefix(self) -> char {
        match self {
            Category::Config => 'C',
            Category::Routing => 'R',
            Category::Bitstream => 'B',
            Category::Protocol => 'P',
        }
    }
}

/// A category plus a numeric discriminant, e.g. `P101`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The broad area this code belongs to.
    pub category: Category,
    /// The numeric discriminant within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let code = DiagnosticCode::new(Category::Protocol, 1);
        assert_eq!(format!("{code}"), "P001");
    }

    #[test]
    fn prefixes() {
        assert_eq!(Category::Config.prefix(), 'C');
        assert_eq!(Category::Routing.prefix(), 'R');
        assert_eq!(Category::Bitstream.prefix(), 'B');
        assert_eq!(Category::Protocol.prefix(), 'P');
    }
}
