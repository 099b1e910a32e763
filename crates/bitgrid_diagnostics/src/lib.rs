//! Structured diagnostic messages, independent of the `Result`-based error
//! types used for control flow.
//!
//! A [`Diagnostic`] describes a user-visible condition (a dropped
//! `LOAD_CHUNK` overflow, an `APPLY` with no completed session, a link
//! failure) that does not necessarily abort the operation producing it.
//! Diagnostics are collected in a [`DiagnosticSink`] and surfaced by callers
//! (typically the server's `--verbose` logging or a CLI's exit-code path).

pub mod code;
pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;
