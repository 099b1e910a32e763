//! Errors surfaced while parsing BGCF payloads.
//!
//! Framing itself never errors — bad magic or an unsupported version just
//! triggers a resync, per [`crate::frame::try_parse_frame`] — so these are
//! only raised by payload-level decoding where truncation is unambiguous.

use thiserror::Error;

/// Failure modes for decoding a BGCF message payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload was shorter than the fixed portion of its message type.
    #[error("truncated {what} payload: expected at least {expected} bytes, got {got}")]
    Truncated {
        /// Which payload was being parsed.
        what: &'static str,
        /// Minimum bytes required.
        expected: usize,
        /// Bytes actually supplied.
        got: usize,
    },

    /// A length-prefixed string or chunk claimed more bytes than remained.
    #[error("{what} length {declared} exceeds remaining payload of {remaining} bytes")]
    LengthOverflow {
        /// Which field overran.
        what: &'static str,
        /// The declared length.
        declared: usize,
        /// Bytes actually remaining.
        remaining: usize,
    },

    /// The message type byte did not match a known [`crate::msg_type::MsgType`].
    #[error("unknown BGCF message type code {0:#04x}")]
    UnknownMessageType(u8),
}
