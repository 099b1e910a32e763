//! The BGCF control-plane wire protocol: a resyncing framed transport over
//! TCP carrying fixed-layout and TLV payloads for bitstream loading,
//! stepping, I/O exchange, and inter-server seam links.

#![warn(missing_docs)]

pub mod error;
pub mod frame;
pub mod msg_type;
pub mod payload;
pub mod tlv;

pub use error::ProtocolError;
pub use frame::{pack_frame, try_parse_frame, Frame, HEADER_SIZE, MAGIC, VERSION};
pub use msg_type::MsgType;
pub use payload::{
    ErrorPayload, HelloPayload, LinkAckPayload, LinkPayload, LoadChunkPayload, StepPayload,
};
pub use tlv::{decode_name_u64_map, encode_name_u64_map};
