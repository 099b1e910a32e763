//! The 16-byte BGCF frame header, plus the resyncing stream parser.

use bitgrid_bitstream::crc32;

/// Magic bytes identifying a BGCF frame.
pub const MAGIC: [u8; 4] = *b"BGCF";

/// The only frame version this codec writes or accepts.
pub const VERSION: u8 = 1;

/// The fixed header size in bytes (magic + 12 header fields).
pub const HEADER_SIZE: usize = 16;

/// A parsed BGCF frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// The header's version byte.
    pub version: u8,
    /// The message type code (see [`crate::msg_type::MsgType`]).
    pub msg_type: u8,
    /// Flag bits (e.g. the "already forwarded" STEP flag).
    pub flags: u8,
    /// Per-connection response sequence number.
    pub seq: u16,
    /// The frame payload.
    pub payload: Vec<u8>,
    /// Whether the payload's CRC-32 matched the header's declared value.
    /// Callers are expected to discard frames where this is `false`.
    pub crc_ok: bool,
}

fn header_crc(version: u8, msg_type: u8, flags: u8, seq: u16, length: u16, payload: &[u8]) -> u32 {
    let mut buf = Vec::with_capacity(6 + payload.len());
    buf.push(version);
    buf.push(msg_type);
    buf.push(flags);
    buf.push(0); // reserved
    buf.extend_from_slice(&seq.to_le_bytes());
    buf.extend_from_slice(&length.to_le_bytes());
    buf.extend_from_slice(payload);
    crc32(&buf)
}

/// Packs `payload` into a complete BGCF frame with the given message type,
/// sequence number, and flags.
pub fn pack_frame(msg_type: u8, payload: &[u8], seq: u16, flags: u8) -> Vec<u8> {
    let length = payload.len() as u16;
    let crc = header_crc(VERSION, msg_type, flags, seq, length, payload);

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.push(msg_type);
    out.push(flags);
    out.push(0); // reserved
    out.extend_from_slice(&seq.to_le_bytes());
    out.extend_from_slice(&length.to_le_bytes());
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Tries to parse one frame from the front of `buffer`.
///
/// Returns `(frame, consumed)`. On a short buffer, `frame` is `None` and
/// `consumed` is 0 — the caller should wait for more bytes before trying
/// again. On a magic or version mismatch, `frame` is `None` but `consumed`
/// is nonzero (1 byte for a magic mismatch, the whole magic for a version
/// mismatch) so the caller resyncs by dropping those bytes and retrying.
/// A CRC failure still returns a frame, with `crc_ok: false` — callers
/// discard those rather than treating them as a framing error.
pub fn try_parse_frame(buffer: &[u8]) -> (Option<Frame>, usize) {
    if buffer.len() < HEADER_SIZE {
        return (None, 0);
    }
    if buffer[0..4] != MAGIC {
        return (None, 1);
    }
    let version = buffer[4];
    if version != VERSION {
        return (None, 4);
    }
    let msg_type = buffer[5];
    let flags = buffer[6];
    let seq = u16::from_le_bytes([buffer[8], buffer[9]]);
    let length = u16::from_le_bytes([buffer[10], buffer[11]]);
    let declared_crc = u32::from_le_bytes([buffer[12], buffer[13], buffer[14], buffer[15]]);

    let total = HEADER_SIZE + length as usize;
    if buffer.len() < total {
        return (None, 0);
    }
    let payload = buffer[HEADER_SIZE..total].to_vec();
    let computed_crc = header_crc(version, msg_type, flags, seq, length, &payload);

    (
        Some(Frame {
            version,
            msg_type,
            flags,
            seq,
            payload,
            crc_ok: computed_crc == declared_crc,
        }),
        total,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_then_parse_round_trip() {
        let frame = pack_frame(0x04, b"hello", 7, 0);
        let (parsed, consumed) = try_parse_frame(&frame);
        assert_eq!(consumed, frame.len());
        let parsed = parsed.unwrap();
        assert!(parsed.crc_ok);
        assert_eq!(parsed.msg_type, 0x04);
        assert_eq!(parsed.seq, 7);
        assert_eq!(parsed.payload, b"hello");
    }

    #[test]
    fn incomplete_header_waits_for_more_bytes() {
        let frame = pack_frame(0x01, b"", 0, 0);
        let (parsed, consumed) = try_parse_frame(&frame[..HEADER_SIZE - 1]);
        assert!(parsed.is_none());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn incomplete_payload_waits_for_more_bytes() {
        let frame = pack_frame(0x01, b"0123456789", 0, 0);
        let (parsed, consumed) = try_parse_frame(&frame[..HEADER_SIZE + 3]);
        assert!(parsed.is_none());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn bad_magic_resyncs_one_byte_at_a_time() {
        let mut garbage = vec![0x00, 0x11, 0x22];
        garbage.extend_from_slice(&pack_frame(0x01, b"x", 1, 0));
        let (parsed, consumed) = try_parse_frame(&garbage);
        assert!(parsed.is_none());
        assert_eq!(consumed, 1);
    }

    #[test]
    fn corrupted_payload_is_reported_not_discarded_by_the_parser() {
        let mut frame = pack_frame(0x01, b"payload", 0, 0);
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        let (parsed, _) = try_parse_frame(&frame);
        assert!(!parsed.unwrap().crc_ok);
    }
}
