//! The BGBS bitstream codec: packs a dense `LUTGrid` into a framed,
//! CRC-checked byte stream and back, and applies a decoded bitstream onto a
//! `Program`.

#![warn(missing_docs)]

pub mod bits;
pub mod codec;
pub mod crc;
pub mod error;
pub mod header;
pub mod scan;

pub use codec::{
    apply_bitstream_to_program, has_bitstream_header, pack_payload,
    pack_program_bitstream_with_header, unpack_bitstream_with_header, unpack_payload,
};
pub use crc::crc32;
pub use error::BitstreamError;
pub use header::Header;
pub use scan::ScanOrder;
