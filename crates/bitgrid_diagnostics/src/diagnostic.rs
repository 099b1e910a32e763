//! A single structured diagnostic message.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message.
///
/// Diagnostics report user-visible conditions that do not necessarily abort
/// the operation that produced them (a dropped protocol-session overflow, an
/// `APPLY` with no completed session). They are independent of the
/// `Result`-based error types used for control flow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The diagnostic message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Creates a new note diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Protocol, 101);
        let diag = Diagnostic::error(code, "unknown session id");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "unknown session id");
        assert_eq!(format!("{}", diag.code), "P101");
    }

    #[test]
    fn create_warning() {
        let code = DiagnosticCode::new(Category::Protocol, 201);
        let diag = Diagnostic::warning(code, "chunk overflow dropped");
        assert_eq!(diag.severity, Severity::Warning);
    }
}
