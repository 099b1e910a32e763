//! Errors surfaced by the bitstream codec.

use thiserror::Error;

/// Failure modes for decoding or applying a bitstream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitstreamError {
    /// The first four bytes were not `"BGBS"`.
    #[error("bad bitstream magic")]
    BadMagic,

    /// The header's version field was not the one byte this codec writes.
    #[error("unsupported bitstream version {0}")]
    UnsupportedVersion(u16),

    /// The header's declared `header_size` was not 24.
    #[error("unexpected bitstream header size {0}")]
    BadHeaderSize(u16),

    /// The header's `order` byte did not match a known scan order.
    #[error("unknown bitstream scan order code {0}")]
    UnknownOrder(u8),

    /// Fewer bytes were supplied than the header's declared payload size.
    #[error("truncated bitstream: expected {expected} payload bytes, got {got}")]
    Truncated {
        /// Payload bytes the header promises.
        expected: usize,
        /// Payload bytes actually supplied.
        got: usize,
    },

    /// The payload's CRC-32 did not match the header's declared checksum.
    #[error("bitstream payload CRC mismatch: header says {expected:#010x}, computed {got:#010x}")]
    CrcMismatch {
        /// The checksum recorded in the header.
        expected: u32,
        /// The checksum actually computed over the payload.
        got: u32,
    },

    /// A headered bitstream's declared dimensions did not match the
    /// Program it was being applied to.
    #[error(
        "bitstream dimensions {got_w}x{got_h} do not match program dimensions {expected_w}x{expected_h}"
    )]
    DimensionMismatch {
        /// The Program's width.
        expected_w: u16,
        /// The Program's height.
        expected_h: u16,
        /// The bitstream header's declared width.
        got_w: u16,
        /// The bitstream header's declared height.
        got_h: u16,
    },
}
